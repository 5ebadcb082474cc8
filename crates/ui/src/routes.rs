use dioxus::prelude::*;
use dioxus_router::{Outlet, Routable};

use crate::views::{ChecklistView, Header, SessionsView, WindowOverlays, WindowTitle};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", ChecklistView)] Checklist {},
        #[route("/sessions", SessionsView)] Sessions {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        WindowTitle {}
        div { class: "app",
            Header {}
            main { class: "content",
                Outlet::<Route> {}
            }
            WindowOverlays {}
        }
    }
}
