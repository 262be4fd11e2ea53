//! Properties Panel Component
//!
//! Editable form for the focused draft; read-only details for saved items.

use leptos::prelude::*;
use org_chart_core::presentation::ParentOption;
use org_chart_core::{CanvasView, DraftId, DraftPatch, NodeId, PanelView};

use super::DeleteConfirmButton;
use crate::actions::{delete_node, report};
use crate::context::AppContext;
use crate::store::{use_chart_store, ChartStateStoreFields};

/// Which form is mounted; keeps inputs alive while their values change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelKind {
    Draft(DraftId),
    Persisted(NodeId),
}

/// Draft fields the form binds to
#[derive(Debug, Clone, PartialEq, Eq)]
struct DraftForm {
    title: String,
    name: String,
    description: String,
    parent: Option<NodeId>,
    level: u32,
    parent_options: Vec<ParentOption>,
    issues: Vec<String>,
    can_delete: bool,
}

impl DraftForm {
    fn from_panel(panel: &PanelView) -> Option<Self> {
        match panel {
            PanelView::Draft { title, name, description, parent, level, parent_options, issues, can_delete, .. } => {
                Some(Self {
                    title: title.clone(),
                    name: name.clone(),
                    description: description.clone(),
                    parent: *parent,
                    level: *level,
                    parent_options: parent_options.clone(),
                    issues: issues.iter().map(|issue| issue.message.clone()).collect(),
                    can_delete: *can_delete,
                })
            }
            PanelView::Persisted { .. } => None,
        }
    }
}

#[component]
pub fn PropertiesPanel(canvas: Memo<CanvasView>) -> impl IntoView {
    let kind = Memo::new(move |_| {
        canvas.with(|view| match &view.panel {
            Some(PanelView::Draft { id, .. }) => Some(PanelKind::Draft(*id)),
            Some(PanelView::Persisted { id, .. }) => Some(PanelKind::Persisted(*id)),
            None => None,
        })
    });

    view! {
        {move || match kind.get() {
            Some(PanelKind::Draft(id)) => view! { <DraftPanel id=id canvas=canvas /> }.into_any(),
            Some(PanelKind::Persisted(_)) => view! { <PersistedPanel canvas=canvas /> }.into_any(),
            None => view! {
                <aside class="properties-panel empty">
                    <p class="panel-hint">"Select a node to see its details"</p>
                </aside>
            }
            .into_any(),
        }}
    }
}

#[component]
fn DraftPanel(id: DraftId, canvas: Memo<CanvasView>) -> impl IntoView {
    let store = use_chart_store();
    let ctx = expect_context::<AppContext>();
    let form = Memo::new(move |_| canvas.with(|view| view.panel.as_ref().and_then(DraftForm::from_panel)));

    let edit = move |patch: DraftPatch| {
        let edited = store.designer().write().edit_draft(id, patch);
        report(ctx, edited);
    };

    let on_name = move |ev| edit(DraftPatch::name(event_target_value(&ev)));
    let on_description = move |ev| {
        let text = event_target_value(&ev);
        let description = (!text.trim().is_empty()).then_some(text);
        edit(DraftPatch { description: Some(description), ..Default::default() });
    };
    let on_parent = move |ev| {
        let value = event_target_value(&ev);
        let parent = value.parse::<usize>().ok().and_then(|index| {
            form.with_untracked(|form| {
                form.as_ref()
                    .and_then(|form| form.parent_options.get(index))
                    .map(|option| option.id)
            })
        });
        edit(DraftPatch::parent(parent));
    };
    // Level is free only at the top; under a parent it follows the parent
    let on_level = move |ev| {
        if let Ok(level) = event_target_value(&ev).parse::<u32>() {
            edit(DraftPatch { level: Some(level), ..Default::default() });
        }
    };

    let field = move |f: fn(&DraftForm) -> String| move || form.with(|form| form.as_ref().map(f).unwrap_or_default());

    view! {
        <aside class="properties-panel" on:mousedown=move |ev| ev.stop_propagation()>
            <h3>{field(|form| form.title.clone())}</h3>

            <label class="panel-field">
                <span>"Name"</span>
                <input
                    type="text"
                    prop:value=field(|form| form.name.clone())
                    on:input=on_name
                />
            </label>
            <For
                each=move || form.with(|form| form.as_ref().map(|form| form.issues.clone()).unwrap_or_default())
                key=|message| message.clone()
                children=move |message| view! { <p class="field-issue">{message}</p> }
            />

            <label class="panel-field">
                <span>"Description"</span>
                <textarea
                    prop:value=field(|form| form.description.clone())
                    on:change=on_description
                ></textarea>
            </label>

            <label class="panel-field">
                <span>"Parent"</span>
                <select on:change=on_parent>
                    <option value="" selected=move || form.with(|form| form.as_ref().is_some_and(|f| f.parent.is_none()))>
                        "(top level)"
                    </option>
                    {move || form.with(|form| {
                        let Some(form) = form else {
                            return Vec::new();
                        };
                        form.parent_options
                            .iter()
                            .enumerate()
                            .map(|(index, option)| {
                                let selected = form.parent == Some(option.id);
                                view! {
                                    <option value=index.to_string() selected=selected>
                                        {option.label.clone()}
                                    </option>
                                }
                            })
                            .collect::<Vec<_>>()
                    })}
                </select>
            </label>

            <label class="panel-field">
                <span>"Level"</span>
                <input
                    type="number"
                    min="0"
                    prop:value=field(|form| form.level.to_string())
                    disabled=move || form.with(|form| form.as_ref().is_some_and(|f| f.parent.is_some()))
                    on:change=on_level
                />
            </label>

            <Show when=move || form.with(|form| form.as_ref().is_some_and(|f| f.can_delete))>
                <DeleteConfirmButton
                    label="Delete"
                    on_confirm=Callback::new(move |_| delete_node(store, ctx, NodeId::Draft(id)))
                />
            </Show>
        </aside>
    }
}

#[component]
fn PersistedPanel(canvas: Memo<CanvasView>) -> impl IntoView {
    let store = use_chart_store();
    let ctx = expect_context::<AppContext>();
    let can_delete = Memo::new(move |_| store.designer().with(|designer| designer.capabilities().can_delete));

    view! {
        {move || canvas.with(|view| match &view.panel {
            Some(PanelView::Persisted { id, title, name, description, parent_name, level, child_count, holder_count }) => {
                let id = *id;
                let subtree_root = id.as_persisted();
                let labels = store.domain().get().labels();
                let counts = [
                    child_count.map(|n| format!("{} {}", n, labels.child_noun)),
                    holder_count.map(|n| format!("{} {}", n, labels.holder_noun)),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" · ");
                Some(view! {
                    <aside class="properties-panel readonly" on:mousedown=move |ev| ev.stop_propagation()>
                        <h3>{title.clone()}</h3>
                        <p class="panel-name">{name.clone()}</p>
                        <p class="panel-description">{description.clone().unwrap_or_default()}</p>
                        <p class="panel-meta">
                            {format!("Level {} · {}", level, parent_name.clone().unwrap_or_else(|| "top level".to_string()))}
                        </p>
                        <p class="panel-meta">{counts}</p>
                        <button
                            class="panel-btn"
                            on:click=move |_| store.filter().update(|filter| filter.root = subtree_root)
                        >
                            "Show subtree only"
                        </button>
                        <Show when=move || can_delete.get()>
                            <DeleteConfirmButton
                                label="Delete"
                                on_confirm=Callback::new(move |_| delete_node(store, ctx, id))
                            />
                        </Show>
                    </aside>
                })
            }
            _ => None,
        })}
    }
}
