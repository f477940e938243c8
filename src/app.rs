use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api::{FetchClient, PredictionClient, UploadFile};
use crate::components::{ChatView, SessionList, SessionSummary, StagedFiles};
use crate::config::ScanConfig;
use crate::controller::ScanController;
use crate::storage::{LocalStorage, MemoryStorage, Storage};
use crate::store::SessionStore;
use crate::types::{ScanModel, SessionId};

type BrowserController = ScanController<Box<dyn Storage>, web_sys::File>;

fn open_storage() -> Box<dyn Storage> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            tracing::warn!(error = %e, "localStorage unavailable; history will not survive a reload");
            Box::new(MemoryStorage::new())
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: ScanConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let controller = {
        let config = props.config.clone();
        use_mut_ref(move || -> BrowserController {
            ScanController::new(SessionStore::load(
                open_storage(),
                config.storage_key,
                config.max_saved_chats,
            ))
        })
    };
    let client = use_memo(props.config.endpoint.clone(), |endpoint| {
        FetchClient::new(endpoint.clone())
    });
    let sidebar_open = use_state(|| true);
    let redraw = use_force_update();

    let on_toggle_sidebar = {
        let sidebar_open = sidebar_open.clone();
        Callback::from(move |_: MouseEvent| sidebar_open.set(!*sidebar_open))
    };

    let on_new = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: ()| {
            controller.borrow_mut().store_mut().create_session();
            redraw.force_update();
        })
    };

    let on_select = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        Callback::from(move |id: SessionId| {
            controller.borrow_mut().store_mut().select_session(id);
            redraw.force_update();
        })
    };

    let on_clear = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: ()| {
            controller.borrow_mut().store_mut().clear_all();
            redraw.force_update();
        })
    };

    let on_model_change = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        Callback::from(move |event: Event| {
            let target = event.target_unchecked_into::<HtmlSelectElement>();
            match target.value().parse::<ScanModel>() {
                Ok(model) => controller.borrow_mut().select_model(model),
                Err(e) => tracing::warn!(error = %e, "Ignoring model selection"),
            }
            redraw.force_update();
        })
    };

    let on_file_change = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        Callback::from(move |event: Event| {
            let target = event.target_unchecked_into::<HtmlInputElement>();
            if let Some(list) = target.files() {
                let picked: Vec<web_sys::File> =
                    (0..list.length()).filter_map(|i| list.get(i)).collect();
                controller.borrow_mut().stage_files(picked);
            }
            // Lets the same file be picked again after removing it.
            target.set_value("");
            redraw.force_update();
        })
    };

    let on_remove = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        Callback::from(move |index: usize| {
            controller.borrow_mut().unstage_file(index);
            redraw.force_update();
        })
    };

    let on_send = {
        let controller = controller.clone();
        let client = client.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            let request = controller.borrow_mut().begin_send();
            redraw.force_update();

            let Some(request) = request else {
                return;
            };
            let controller = controller.clone();
            let client = client.clone();
            let redraw = redraw.clone();
            spawn_local(async move {
                let outcome = client.predict(&request.files, request.model).await;
                controller.borrow_mut().finish_send(request.session, outcome);
                redraw.force_update();
            });
        })
    };

    let state = controller.borrow();
    let store = state.store();
    let sessions: Vec<SessionSummary> = store.sessions().map(SessionSummary::from).collect();
    let title = store
        .active_session()
        .map(|session| session.title.clone())
        .unwrap_or_else(|| "Vulnerability Scanner".to_string());
    let entries = store.transcript().to_vec();
    let staged = state.staged_files().iter().map(UploadFile::to_ref).collect::<Vec<_>>();
    let busy = state.is_busy();
    let selected_model = state.selected_model();
    let active = store.active();
    let max_sessions = store.max_sessions();
    drop(state);

    html! {
        <div style="display:flex; flex-direction:row; height:100vh; font-family:Arial,sans-serif;">
            { if *sidebar_open {
                html! {
                    <SessionList
                        {sessions}
                        {active}
                        {max_sessions}
                        {on_select}
                        {on_new}
                        {on_clear}
                    />
                }
            } else {
                html! {}
            }}

            <div style="flex:1; display:flex; flex-direction:column; background:#f9fafb;">
                <header style="display:flex; align-items:center; gap:1em; padding:0.75em 1em; background:white; border-bottom:1px solid #ddd;">
                    <button onclick={on_toggle_sidebar} title="Toggle conversations"
                        style="padding:0.3em 0.6em; border:1px solid #ccc; background:white; border-radius:4px; cursor:pointer;">
                        { "☰" }
                    </button>
                    <select onchange={on_model_change}
                        style="padding:0.4em; border:1px solid #ccc; border-radius:4px;">
                        { for ScanModel::ALL.iter().map(|model| html! {
                            <option value={model.as_str()} selected={*model == selected_model}>{ model.as_str() }</option>
                        }) }
                    </select>
                    <p style="margin:0; font-weight:bold; color:#333;">{ title }</p>
                </header>

                <ChatView {entries} {busy} />

                <StagedFiles files={staged} {on_remove} />

                <div style="display:flex; align-items:center; gap:0.75em; padding:0.75em 1em; background:white; border-top:1px solid #ddd;">
                    <label style="flex:1; color:#555;">
                        { "Source files: " }
                        <input type="file" multiple=true onchange={on_file_change} />
                    </label>
                    <button
                        onclick={on_send}
                        disabled={busy}
                        style={format!(
                            "padding:0.6em 1.4em; font-size:1em; border:none; border-radius:4px; {}",
                            if busy {
                                "background:#ccc; cursor:not-allowed;"
                            } else {
                                "background:#007bff; color:white; cursor:pointer;"
                            }
                        )}
                    >
                        { if busy { "Scanning..." } else { "Send" } }
                    </button>
                </div>
            </div>
        </div>
    }
}
