//! Notice Bar Component

use leptos::prelude::*;

use crate::context::AppContext;

/// Toast for save results and refused gestures
#[component]
pub fn NoticeBar() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    view! {
        {move || ctx.notice.get().map(|notice| view! {
            <div class=notice.class() on:click=move |_| ctx.dismiss()>
                {notice.message.clone()}
            </div>
        })}
    }
}
