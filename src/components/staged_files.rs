use yew::prelude::*;

use crate::components::chat_view::format_size;
use crate::types::FileRef;

#[derive(Properties, PartialEq)]
pub struct StagedFilesProps {
    pub files: Vec<FileRef>,
    pub on_remove: Callback<usize>,
}

#[function_component(StagedFiles)]
pub fn staged_files(props: &StagedFilesProps) -> Html {
    if props.files.is_empty() {
        return html! {};
    }

    html! {
        <div style="padding:0.5em 1em; background:#f3f4f6; border-top:1px solid #ddd;">
            <ul style="margin:0; padding:0; list-style:none; display:flex; flex-wrap:wrap; gap:0.5em;">
                { for props.files.iter().enumerate().map(|(index, file)| {
                    let on_click = {
                        let on_remove = props.on_remove.clone();
                        Callback::from(move |_: MouseEvent| on_remove.emit(index))
                    };
                    html! {
                        <li style="display:flex; align-items:center; gap:0.4em; padding:0.3em 0.6em; background:white; border:1px solid #ccc; border-radius:4px; font-size:0.9em;">
                            { &file.name }
                            <span style="color:#888; font-size:0.8em;">{ format_size(file.size) }</span>
                            <button onclick={on_click} title="Remove"
                                style="border:none; background:transparent; color:#dc3545; cursor:pointer;">
                                { "✕" }
                            </button>
                        </li>
                    }
                }) }
            </ul>
        </div>
    }
}
