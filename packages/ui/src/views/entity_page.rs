//! # Entity page: list, creation wizard, edit modal and delete confirmation
//!
//! [`entity_page`] renders one kind end to end. It owns a [`LiveList`] inside a
//! resource keyed on the signed-in owner and the configured order: when either changes
//! the resource restarts, which drops the old subscription before the next one opens.
//! Retry re-opens the subscription in place so the last snapshot stays on screen.
//!
//! Writes go through `prepare_*` / `finish_*` so no signal is held across an await.

use std::pin::pin;
use std::rc::Rc;

use chrono::{NaiveDate, Utc};
use dioxus::prelude::*;
use dioxus_free_icons::icons::fa_solid_icons::{FaPenToSquare, FaPlus, FaTrash};
use dioxus_free_icons::Icon;
use flows::{
    Answer, DeleteConfirmation, EditModal, EntityList, FieldInput, FieldPrompt, FieldValue, Kind,
    ListStatus, LiveList, StepPrompt, Wizard,
};
use futures::future::{select, Either};
use store::{Collection, Entry};
use tokio::sync::watch;

use crate::activity_log::{log_activity_in, use_activity_log, ActivityLog, LogLevel};
use crate::auth::{use_auth, LoginButton};
use crate::config::{use_app_config, use_store};
use crate::remote::RemoteStore;
use crate::views::ModalOverlay;

const DATE_FORMAT: &str = "%Y-%m-%d";

type Retry = Rc<watch::Sender<u64>>;

enum Wake {
    Delivered(bool),
    Retry(bool),
}

/// Page for one entity kind. Call from a route component; the hooks belong to it.
pub fn entity_page<K: Kind>() -> Element {
    let session = use_auth();
    let config = use_app_config();
    let store = use_store();
    let activity = use_activity_log();

    let owner = use_memo(move || session().owner_id().map(str::to_string));
    let order = use_memo(move || config().list.order);

    let mut list = use_signal(EntityList::<K>::default);
    let wizard = use_signal(Wizard::<K>::new);
    let wizard_open = use_signal(|| false);
    let edit = use_signal(EditModal::<K>::default);
    let confirm = use_signal(DeleteConfirmation::<K>::default);
    let retry: Retry = use_hook(|| Rc::new(watch::channel(0).0));

    let feed_store = store.clone();
    let feed_retry = retry.clone();
    let _feed = use_resource(move || {
        let store = feed_store.clone();
        let retry = feed_retry.clone();
        async move {
            let owner = owner();
            let mut live = LiveList::new(Collection::<RemoteStore, K>::new(store), order());
            live.set_owner(owner.as_deref());
            list.set(live.list().clone());
            let mut retries = retry.subscribe();

            loop {
                let wake = match select(pin!(live.next()), pin!(retries.changed())).await {
                    Either::Left((delivered, _)) => Wake::Delivered(delivered),
                    Either::Right((changed, _)) => Wake::Retry(changed.is_ok()),
                };
                match wake {
                    Wake::Delivered(true) => list.set(live.list().clone()),
                    Wake::Delivered(false) => {
                        // Nothing subscribed; only a retry can change that.
                        if retries.changed().await.is_err() {
                            return;
                        }
                        live.retry();
                        list.set(live.list().clone());
                    }
                    Wake::Retry(true) => {
                        tracing::info!(collection = K::COLLECTION, "retrying subscription");
                        live.retry();
                        list.set(live.list().clone());
                    }
                    Wake::Retry(false) => return,
                }
            }
        }
    });

    let current = list();
    // The session can change before the resource rescopes the list.
    let viewer = owner();
    let status = current.status_for(viewer.as_deref());
    let entries = current.entries_for(viewer.as_deref()).to_vec();
    let mut open_wizard = wizard_open;
    let (title, noun, empty) = (K::TITLE, K::NOUN, K::EMPTY);

    rsx! {
        div {
            class: "entity-page",
            div {
                class: "entity-page-header",
                h1 { "{title}" }
                if session().is_signed_in() {
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| open_wizard.set(true),
                        Icon { icon: FaPlus, width: 14, height: 14 }
                        span { " Add {noun}" }
                    }
                }
            }

            {match status.clone() {
                ListStatus::SignedOut => rsx! {
                    if session().loading {
                        p { class: "entity-page-status", "Loading..." }
                    } else {
                        div {
                            class: "entity-page-signed-out",
                            p { "Sign in to see your {noun}s." }
                            LoginButton {}
                        }
                    }
                },
                ListStatus::Loading => rsx! {
                    p { class: "entity-page-status", "Loading..." }
                },
                ListStatus::Failed(error) => rsx! {
                    div {
                        class: "inline-error",
                        span { "Could not load {noun}s: {error}" }
                        button {
                            class: "btn",
                            onclick: move |_| retry.send_modify(|v| *v = v.wrapping_add(1)),
                            "Retry"
                        }
                    }
                },
                ListStatus::Live => rsx! {},
            }}

            if entries.is_empty() && status == ListStatus::Live {
                p { class: "entity-page-empty", "{empty}" }
            }

            div {
                class: "entity-list",
                {entries.into_iter().map(|entry| entity_row(entry, edit, confirm))}
            }
        }

        if wizard_open() {
            {wizard_modal(wizard, wizard_open, owner, store.clone(), activity)}
        }
        if edit().is_open() {
            {edit_modal(edit, store.clone(), activity)}
        }
        if confirm().is_open() {
            {delete_dialog(confirm, store.clone(), activity)}
        }
    }
}

fn entity_row<K: Kind>(
    entry: Entry<K>,
    mut edit: Signal<EditModal<K>>,
    mut confirm: Signal<DeleteConfirmation<K>>,
) -> Element {
    let fields = &entry.fields;
    let accent = fields.accent();
    let emoji = fields.emoji();
    let headline = fields.headline();
    let details = fields.details();
    let notes = fields.notes().filter(|n| !n.trim().is_empty()).map(str::to_string);
    let id = entry.id.clone();
    let edit_target = entry.clone();
    let delete_target = entry.clone();

    rsx! {
        div {
            key: "{id}",
            class: "entity-row {accent}",
            span { class: "entity-row-emoji", "{emoji}" }
            div {
                class: "entity-row-body",
                h3 { "{headline}" }
                for line in details {
                    p { "{line}" }
                }
                if let Some(notes) = notes {
                    p { class: "entity-row-notes", "{notes}" }
                }
            }
            div {
                class: "entity-row-actions",
                button {
                    title: "Edit",
                    onclick: move |_| edit.write().open(&edit_target),
                    Icon { icon: FaPenToSquare, width: 14, height: 14 }
                }
                button {
                    title: "Delete",
                    onclick: move |_| confirm.write().stage(&delete_target),
                    Icon { icon: FaTrash, width: 14, height: 14 }
                }
            }
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn wizard_modal<K: Kind>(
    mut wizard: Signal<Wizard<K>>,
    mut open: Signal<bool>,
    owner: Memo<Option<String>>,
    store: RemoteStore,
    mut activity: Signal<ActivityLog>,
) -> Element {
    let noun = K::NOUN;
    let state = wizard();
    let prompt = state.prompt();
    let heading = prompt.title().to_string();
    let progress = state.progress_percent();
    let position = state.index() + 1;
    let total = state.total();
    let error = state.error().map(|e| e.to_string());
    let submitting = state.is_submitting();

    let mut cancel = move || {
        wizard.write().reset();
        open.set(false);
    };

    let submit = move |_: MouseEvent| {
        let store = store.clone();
        async move {
            let owner = owner();
            let prepared = wizard.write().prepare_submit(owner.as_deref(), Utc::now());
            let Ok((owner_id, entity)) = prepared else {
                return;
            };
            let result = Collection::<RemoteStore, K>::new(store)
                .create(&owner_id, &entity)
                .await;
            let outcome = wizard.write().finish_submit(result);
            match outcome {
                Ok(_) => {
                    open.set(false);
                    let message = format!("Added {}", K::NOUN);
                    log_activity_in(&mut activity, K::COLLECTION, LogLevel::Success, &message);
                }
                Err(e) => log_activity_in(
                    &mut activity,
                    K::COLLECTION,
                    LogLevel::Error,
                    &format!("Could not add {}: {e}", K::NOUN),
                ),
            }
        }
    };

    rsx! {
        ModalOverlay {
            on_close: move |_| cancel(),
            div {
                class: "wizard",
                h2 { "Add {noun}" }
                div {
                    class: "wizard-progress",
                    div { class: "wizard-progress-bar", style: "width: {progress}%" }
                }
                p { class: "wizard-step-count", "Step {position} of {total}" }
                h3 { "{heading}" }

                {step_input(wizard, prompt)}

                if let Some(error) = error {
                    p { class: "inline-error", "{error}" }
                }

                div {
                    class: "wizard-actions",
                    button {
                        class: "btn",
                        onclick: move |_| cancel(),
                        "Cancel"
                    }
                    button {
                        class: "btn",
                        disabled: state.is_first(),
                        onclick: move |_| wizard.write().previous(),
                        "Previous"
                    }
                    if state.is_last() {
                        button {
                            class: "btn btn-primary",
                            disabled: submitting,
                            onclick: submit,
                            if submitting { "Saving..." } else { "Submit" }
                        }
                    } else {
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| {
                                let _ = wizard.write().next();
                            },
                            "Next"
                        }
                    }
                }
            }
        }
    }
}

fn step_input<K: Kind>(mut wizard: Signal<Wizard<K>>, prompt: StepPrompt) -> Element {
    match prompt {
        StepPrompt::Pick {
            options,
            selected,
            custom,
            ..
        } => rsx! {
            div {
                class: "option-grid",
                for option in options {
                    button {
                        class: if selected.as_deref() == Some(option) { "option selected" } else { "option" },
                        onclick: move |_| wizard.write().answer(Answer::Pick(option.to_string())),
                        "{option}"
                    }
                }
            }
            if let Some(custom) = custom {
                input {
                    class: "custom-input",
                    r#type: "text",
                    maxlength: flows::Choice::MAX_CUSTOM_LEN as i64,
                    placeholder: custom.placeholder,
                    value: custom.value,
                    oninput: move |evt: FormEvent| wizard.write().answer(Answer::Custom(evt.value())),
                }
            }
        },
        StepPrompt::Toggle {
            options, selected, ..
        } => rsx! {
            div {
                class: "option-grid",
                for option in options {
                    button {
                        class: if selected.iter().any(|s| s == option) { "option selected" } else { "option" },
                        onclick: move |_| wizard.write().answer(Answer::Toggle(option.to_string())),
                        "{option}"
                    }
                }
            }
        },
        StepPrompt::Date { value, .. } => rsx! {
            input {
                class: "date-input",
                r#type: "date",
                value: format_date(value),
                oninput: move |evt: FormEvent| wizard.write().answer(Answer::Date(parse_date(&evt.value()))),
            }
        },
    }
}

fn edit_modal<K: Kind>(
    mut modal: Signal<EditModal<K>>,
    store: RemoteStore,
    mut activity: Signal<ActivityLog>,
) -> Element {
    let noun = K::NOUN;
    let state = modal();
    let fields = state.fields();
    let error = state.error().map(|e| e.to_string());
    let saving = state.is_saving();

    let save = move |_: MouseEvent| {
        let store = store.clone();
        async move {
            let Some(entry) = modal.write().prepare_save() else {
                return;
            };
            let result = Collection::<RemoteStore, K>::new(store).update(&entry).await;
            let outcome = modal.write().finish_save(result);
            match outcome {
                Ok(()) => {
                    let message = format!("Updated {}", K::NOUN);
                    log_activity_in(&mut activity, K::COLLECTION, LogLevel::Success, &message);
                }
                Err(e) => log_activity_in(
                    &mut activity,
                    K::COLLECTION,
                    LogLevel::Error,
                    &format!("Could not update {}: {e}", K::NOUN),
                ),
            }
        }
    };

    rsx! {
        ModalOverlay {
            on_close: move |_| modal.write().close(),
            div {
                class: "edit-form",
                h2 { "Edit {noun}" }
                {fields.into_iter().map(|field| field_input(modal, field))}

                if let Some(error) = error {
                    p { class: "inline-error", "{error}" }
                }

                div {
                    class: "wizard-actions",
                    button {
                        class: "btn",
                        onclick: move |_| modal.write().close(),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        disabled: saving,
                        onclick: save,
                        if saving { "Saving..." } else { "Save" }
                    }
                }
            }
        }
    }
}

fn field_input<K: Kind>(mut modal: Signal<EditModal<K>>, field: FieldPrompt) -> Element {
    let key = field.key;
    let label = field.label;

    let input = match field.input {
        FieldInput::Text(value) if key == "notes" => rsx! {
            textarea {
                rows: "3",
                value: value,
                oninput: move |evt: FormEvent| modal.write().set(key, FieldValue::Text(evt.value())),
            }
        },
        FieldInput::Text(value) => rsx! {
            input {
                r#type: "text",
                value: value,
                oninput: move |evt: FormEvent| modal.write().set(key, FieldValue::Text(evt.value())),
            }
        },
        FieldInput::Date(value) => rsx! {
            input {
                r#type: "date",
                value: format_date(value),
                oninput: move |evt: FormEvent| modal.write().set(key, FieldValue::Date(parse_date(&evt.value()))),
            }
        },
        FieldInput::Select {
            options,
            value,
            blank,
        } => {
            // A stored custom value is offered so saving without touching it keeps it.
            let extra = (!value.is_empty() && !options.iter().any(|o| *o == value))
                .then(|| value.clone());
            rsx! {
                select {
                    value: value.clone(),
                    onchange: move |evt: FormEvent| modal.write().set(key, FieldValue::Text(evt.value())),
                    if let Some(blank) = blank {
                        option { value: "", selected: value.is_empty(), "{blank}" }
                    }
                    if let Some(extra) = extra {
                        option { value: "{extra}", selected: true, "{extra}" }
                    }
                    for choice in options {
                        option { value: choice, selected: value == choice, "{choice}" }
                    }
                }
            }
        }
        FieldInput::Toggles { options, selected } => rsx! {
            div {
                class: "option-grid",
                for option in options {
                    button {
                        class: if selected.iter().any(|s| s == option) { "option selected" } else { "option" },
                        onclick: move |_| modal.write().set(key, FieldValue::Toggle(option.to_string())),
                        "{option}"
                    }
                }
            }
        },
    };

    rsx! {
        label {
            key: "{key}",
            class: "edit-field",
            span { "{label}" }
            {input}
        }
    }
}

fn delete_dialog<K: Kind>(
    mut confirm: Signal<DeleteConfirmation<K>>,
    store: RemoteStore,
    mut activity: Signal<ActivityLog>,
) -> Element {
    let noun = K::NOUN;
    let state = confirm();
    let headline = state
        .pending()
        .map(|entry| entry.fields.headline())
        .unwrap_or_default();
    let error = state.error().map(|e| e.to_string());
    let busy = state.is_busy();

    let delete = move |_: MouseEvent| {
        let store = store.clone();
        async move {
            let Some(id) = confirm.write().prepare_confirm() else {
                return;
            };
            let result = Collection::<RemoteStore, K>::new(store).delete(&id).await;
            let outcome = confirm.write().finish(result);
            match outcome {
                Ok(()) => {
                    let message = format!("Deleted {}", K::NOUN);
                    log_activity_in(&mut activity, K::COLLECTION, LogLevel::Success, &message);
                }
                Err(e) => log_activity_in(
                    &mut activity,
                    K::COLLECTION,
                    LogLevel::Error,
                    &format!("Could not delete {}: {e}", K::NOUN),
                ),
            }
        }
    };

    rsx! {
        ModalOverlay {
            on_close: move |_| confirm.write().cancel(),
            div {
                class: "confirm-dialog",
                h2 { "Delete {noun}?" }
                p { "\"{headline}\" will be removed permanently." }
                if let Some(error) = error {
                    p { class: "inline-error", "{error}" }
                }
                div {
                    class: "wizard-actions",
                    button {
                        class: "btn",
                        onclick: move |_| confirm.write().cancel(),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-danger",
                        disabled: busy,
                        onclick: delete,
                        if busy { "Deleting..." } else { "Delete" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_input_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(format_date(date), "2024-03-01");
        assert_eq!(parse_date("2024-03-01"), date);
        assert_eq!(format_date(None), "");
        assert_eq!(parse_date(""), None);
    }
}
