//! Admin Console App
//!
//! Provides the shared context and mounts the settings page.

use leptos::prelude::*;
use leptos_dragdrop::create_dnd_signals;

use crate::context::AppContext;
use crate::pages::UserManagementPage;

#[component]
pub fn App() -> impl IntoView {
    let notice = signal::<Option<String>>(None);
    let adding_column = signal(None);
    let dnd = create_dnd_signals();

    // Provide context to all children
    let ctx = AppContext::new(notice, adding_column, dnd);
    provide_context(ctx);

    view! {
        <div class="app-layout">
            <main class="main-content">
                <UserManagementPage />
                {move || ctx.notice.get().map(|message| view! {
                    <div class="status-bar" on:click=move |_| ctx.clear_notice()>
                        {message}
                    </div>
                })}
            </main>
        </div>
    }
}
