use yew::prelude::*;

use crate::types::{Session, SessionId};

/// What the sidebar needs from a session, without its transcript.
#[derive(Clone, PartialEq, Debug)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub formatted_date: String,
    pub entries: usize,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            title: session.title.clone(),
            formatted_date: session.formatted_date.clone(),
            entries: session.transcript().len(),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct SessionListProps {
    pub sessions: Vec<SessionSummary>,
    pub active: Option<SessionId>,
    pub max_sessions: usize,
    pub on_select: Callback<SessionId>,
    pub on_new: Callback<()>,
    pub on_clear: Callback<()>,
}

#[function_component(SessionList)]
pub fn session_list(props: &SessionListProps) -> Html {
    let on_new = {
        let on_new = props.on_new.clone();
        Callback::from(move |_: MouseEvent| on_new.emit(()))
    };
    let on_clear = {
        let on_clear = props.on_clear.clone();
        Callback::from(move |_: MouseEvent| on_clear.emit(()))
    };

    html! {
        <div style="width:280px; min-width:280px; padding:1.5em; background:#111827; color:#e5e7eb; display:flex; flex-direction:column; gap:1em;">
            <div style="display:flex; align-items:center; justify-content:space-between;">
                <h2 style="margin:0; font-size:1.1em;">{ "Conversations" }</h2>
                <button onclick={on_new} title="New conversation"
                    style="padding:0.3em 0.7em; background:#3b82f6; color:white; border:none; border-radius:4px; cursor:pointer;">
                    { "+" }
                </button>
            </div>
            <div style="font-size:0.8em; color:#9ca3af;">
                { format!("The last {} conversations are kept", props.max_sessions) }
            </div>

            <div style="flex:1; display:flex; flex-direction:column; gap:0.5em; overflow-y:auto;">
                { if props.sessions.is_empty() {
                    html! { <div style="color:#6b7280; font-size:0.9em;">{ "No saved conversations" }</div> }
                } else {
                    html! {
                        { for props.sessions.iter().rev().map(|session| {
                            let on_click = {
                                let on_select = props.on_select.clone();
                                let id = session.id;
                                Callback::from(move |_: MouseEvent| on_select.emit(id))
                            };
                            let background = if props.active == Some(session.id) { "#374151" } else { "#1f2937" };

                            html! {
                                <div onclick={on_click} class="session-card"
                                    style={format!("padding:0.75em; border-radius:6px; cursor:pointer; background:{};", background)}>
                                    <div style="font-weight:bold; font-size:0.95em;">{ &session.title }</div>
                                    <div style="margin-top:0.25em; font-size:0.75em; color:#9ca3af;">
                                        { format!("{} · {} message{}", session.formatted_date, session.entries, if session.entries != 1 { "s" } else { "" }) }
                                    </div>
                                </div>
                            }
                        }) }
                    }
                }}
            </div>

            <button onclick={on_clear}
                disabled={props.sessions.is_empty()}
                style="padding:0.6em 0; background:transparent; color:#f87171; border:1px solid #f87171; border-radius:4px; cursor:pointer;">
                { "Clear all conversations" }
            </button>
        </div>
    }
}
