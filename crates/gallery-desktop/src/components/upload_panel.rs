//! Modal form for adding a prompt to the gallery

use dioxus::prelude::*;
use gallery_core::models::Category;

use crate::state::AppState;
use crate::theme::palette;

#[component]
pub fn UploadPanel() -> Element {
    let mut state = use_context::<AppState>();
    let colors = palette();
    let mut submitting = use_signal(|| false);
    let mut submit_error = use_signal(|| None::<String>);

    let form = state.upload_form.read().clone();
    let selected_category = form.category.as_str();

    let field_style = format!(
        "width: 100%; box-sizing: border-box; padding: 8px 10px; border: 1px solid {}; \
         border-radius: 8px; background: {}; color: {}; font-size: 14px;",
        colors.border, colors.bg_tertiary, colors.text_primary
    );
    let label_style = format!(
        "display: flex; flex-direction: column; gap: 6px; font-size: 13px; color: {};",
        colors.text_secondary
    );

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        submitting.set(true);
        let runtime = state.runtime();
        let form = state.upload_form.read().clone();

        spawn(async move {
            let result = runtime.upload(&form).await;
            submitting.set(false);
            match result {
                Ok(id) => {
                    tracing::debug!("Upload stored as {}", id);
                    submit_error.set(None);
                    state.upload_form.write().reset();
                    state.upload_open.set(false);
                }
                Err(e) => {
                    tracing::warn!("Upload failed: {}", e);
                    submit_error.set(Some(e.to_string()));
                }
            }
        });
    };

    rsx! {
        div {
            class: "upload-backdrop",
            style: "
                position: fixed;
                inset: 0;
                display: flex;
                align-items: center;
                justify-content: center;
                background: {colors.overlay};
                z-index: 50;
            ",

            form {
                onsubmit: on_submit,
                style: "
                    width: 460px;
                    display: flex;
                    flex-direction: column;
                    gap: 14px;
                    padding: 24px;
                    border-radius: 16px;
                    background: {colors.bg_secondary};
                ",

                h2 {
                    style: "margin: 0; font-size: 20px;",
                    "Add a prompt"
                }

                label {
                    style: "{label_style}",
                    "Title"
                    input {
                        r#type: "text",
                        style: "{field_style}",
                        value: "{form.title}",
                        oninput: move |evt| state.upload_form.write().title = evt.value(),
                    }
                }

                label {
                    style: "{label_style}",
                    "Image URL"
                    input {
                        r#type: "url",
                        placeholder: "https://",
                        style: "{field_style}",
                        value: "{form.url}",
                        oninput: move |evt| state.upload_form.write().url = evt.value(),
                    }
                }

                label {
                    style: "{label_style}",
                    "Prompt"
                    textarea {
                        rows: "4",
                        style: "{field_style} resize: vertical;",
                        value: "{form.prompt}",
                        oninput: move |evt| state.upload_form.write().prompt = evt.value(),
                    }
                }

                label {
                    style: "{label_style}",
                    "Category"
                    select {
                        style: "{field_style}",
                        value: "{selected_category}",
                        onchange: move |evt| {
                            match evt.value().parse::<Category>() {
                                Ok(category) => state.upload_form.write().category = category,
                                Err(e) => tracing::warn!("Ignoring category choice: {}", e),
                            }
                        },
                        for category in Category::ALL {
                            option {
                                value: "{category}",
                                selected: category == form.category,
                                "{category}"
                            }
                        }
                    }
                }

                if let Some(error) = submit_error() {
                    p {
                        style: "margin: 0; font-size: 13px; color: {colors.error};",
                        "{error}"
                    }
                }

                div {
                    style: "display: flex; justify-content: flex-end; gap: 10px;",
                    button {
                        r#type: "button",
                        style: "
                            padding: 8px 16px;
                            border: 1px solid {colors.border};
                            border-radius: 8px;
                            background: transparent;
                            color: {colors.text_primary};
                            cursor: pointer;
                        ",
                        onclick: move |_| {
                            submit_error.set(None);
                            state.upload_open.set(false);
                        },
                        "Cancel"
                    }
                    button {
                        r#type: "submit",
                        disabled: submitting(),
                        style: "
                            padding: 8px 16px;
                            border: none;
                            border-radius: 8px;
                            background: {colors.accent};
                            color: {colors.accent_text};
                            font-weight: 600;
                            cursor: pointer;
                        ",
                        if submitting() { "Saving..." } else { "Save" }
                    }
                }
            }
        }
    }
}
