//! Backend worker: owns the catalog console on a tokio runtime and drains the
//! prompt's command queue one command at a time.

use std::{
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::{
    CatalogConsole, ConsoleError, Credentials, FileCredentialStore, FormMode, GatewayConfig,
    HttpCatalogGateway, SessionStore,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    gateway_config: GatewayConfig,
    credentials_path: PathBuf,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                emit_error(
                    &ui_tx,
                    UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("failed to build backend runtime: {err}"),
                    ),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let gateway = match HttpCatalogGateway::new(gateway_config) {
                Ok(gateway) => gateway,
                Err(err) => {
                    emit_error(
                        &ui_tx,
                        UiError::from_message(
                            UiErrorContext::BackendStartup,
                            format!("failed to build http client: {err}"),
                        ),
                    );
                    tracing::error!("failed to build http client: {err}");
                    return;
                }
            };
            tracing::info!(
                base_url = gateway.config().base_url(),
                api_path = gateway.config().api_path(),
                credentials = %credentials_path.display(),
                "backend worker starting"
            );

            let session = SessionStore::open(Box::new(FileCredentialStore::new(credentials_path)));
            let mut console = CatalogConsole::new(Arc::new(gateway), session);

            match console.restore_session().await {
                Ok(true) => {
                    emit(&ui_tx, UiEvent::SessionRestored);
                    emit(&ui_tx, UiEvent::CatalogReplaced(console.catalog().to_vec()));
                }
                Ok(false) => emit(&ui_tx, UiEvent::LoginRequired),
                Err(err) => {
                    emit_error(
                        &ui_tx,
                        UiError::from_console_error(UiErrorContext::LoadCatalog, &err),
                    );
                    emit(&ui_tx, UiEvent::LoginRequired);
                }
            }

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(&mut console, cmd, &ui_tx).await;
            }
            tracing::info!("backend worker stopped");
        });
    })
}

async fn handle_command(console: &mut CatalogConsole, cmd: BackendCommand, ui_tx: &Sender<UiEvent>) {
    let cmd_name = cmd.name();
    tracing::debug!(command = cmd_name, "backend command received");

    if cmd.requires_session() && !console.is_authenticated() {
        emit_error(ui_tx, UiError::usage("Not signed in; use 'login <username> <password>'"));
        return;
    }

    match cmd {
        BackendCommand::Login { username, password } => {
            let credentials = Credentials { username, password };
            match console.login(&credentials).await {
                Ok(()) => {
                    emit(ui_tx, UiEvent::LoggedIn);
                    emit(ui_tx, UiEvent::CatalogReplaced(console.catalog().to_vec()));
                }
                Err(err) => report(ui_tx, UiErrorContext::Login, &err),
            }
        }
        BackendCommand::Refresh => match console.refresh().await {
            Ok(()) => emit(ui_tx, UiEvent::CatalogReplaced(console.catalog().to_vec())),
            Err(err) => report(ui_tx, UiErrorContext::LoadCatalog, &err),
        },
        BackendCommand::OpenCreate => {
            console.request_create();
            emit_form(console, ui_tx);
        }
        BackendCommand::OpenEdit { row } => match console.catalog().get(row).cloned() {
            Some(product) => {
                console.request_edit(&product);
                emit_form(console, ui_tx);
            }
            None => emit_error(ui_tx, no_such_row(row, console.catalog().len())),
        },
        BackendCommand::EditField { field, value } => {
            match console.form_mut().edit_field(field, value) {
                Ok(()) => emit_form(console, ui_tx),
                Err(err) => report(ui_tx, UiErrorContext::Form, &ConsoleError::from(err)),
            }
        }
        BackendCommand::EditImage { slot, url } => {
            match console.form_mut().edit_image_at(slot, url) {
                Ok(()) => emit_form(console, ui_tx),
                Err(err) => report(ui_tx, UiErrorContext::Form, &ConsoleError::from(err)),
            }
        }
        BackendCommand::AddImageSlot => match console.form_mut().add_image_slot() {
            Ok(true) => emit_form(console, ui_tx),
            Ok(false) => emit(
                ui_tx,
                UiEvent::Info("Fill in the last image slot first (at most 5 slots)".to_string()),
            ),
            Err(err) => report(ui_tx, UiErrorContext::Form, &ConsoleError::from(err)),
        },
        BackendCommand::RemoveImage { slot } => {
            if console.form().is_open() && !console.form().can_remove_image_at(slot) {
                emit(ui_tx, UiEvent::Info(format!("Image slot {} is empty or missing", slot + 1)));
                return;
            }
            match console.form_mut().remove_image_at(slot) {
                Ok(_) => emit_form(console, ui_tx),
                Err(err) => report(ui_tx, UiErrorContext::Form, &ConsoleError::from(err)),
            }
        }
        BackendCommand::ShowForm => emit_form(console, ui_tx),
        BackendCommand::Commit => match console.commit().await {
            Ok(outcome) => {
                let done = match outcome.mode {
                    FormMode::Create => "Product created",
                    FormMode::Edit => "Product updated",
                };
                emit(ui_tx, UiEvent::Info(done.to_string()));
                emit_form(console, ui_tx);
                emit(ui_tx, UiEvent::CatalogReplaced(console.catalog().to_vec()));
            }
            Err(err) => {
                let context = match err {
                    ConsoleError::Fetch(_) => UiErrorContext::LoadCatalog,
                    ConsoleError::Form(_) => UiErrorContext::Form,
                    _ => UiErrorContext::SaveProduct,
                };
                report(ui_tx, context, &err);
                emit_form(console, ui_tx);
            }
        },
        BackendCommand::CloseForm => {
            console.close_form();
            emit_form(console, ui_tx);
        }
        BackendCommand::RequestDelete { row } => match console.catalog().get(row).cloned() {
            Some(product) => {
                console.request_delete(product.clone());
                emit(ui_tx, UiEvent::DeleteRequested(product));
            }
            None => emit_error(ui_tx, no_such_row(row, console.catalog().len())),
        },
        BackendCommand::ConfirmDelete => match console.confirm_delete().await {
            Ok(product) => {
                emit(ui_tx, UiEvent::Info(format!("Deleted '{}'", product.title)));
                emit(ui_tx, UiEvent::CatalogReplaced(console.catalog().to_vec()));
            }
            Err(err) => {
                let context = match err {
                    ConsoleError::Fetch(_) => UiErrorContext::LoadCatalog,
                    ConsoleError::Form(_) => UiErrorContext::Form,
                    _ => UiErrorContext::DeleteProduct,
                };
                report(ui_tx, context, &err);
            }
        },
        BackendCommand::CancelDelete => match console.cancel_delete() {
            Some(product) => emit(ui_tx, UiEvent::Info(format!("Kept '{}'", product.title))),
            None => emit(ui_tx, UiEvent::Info("No delete pending".to_string())),
        },
    }
}

fn no_such_row(row: usize, len: usize) -> UiError {
    UiError::usage(format!("No catalog row {}; the catalog has {len} rows", row + 1))
}

fn emit_form(console: &CatalogConsole, ui_tx: &Sender<UiEvent>) {
    emit(ui_tx, UiEvent::FormUpdated(console.form().snapshot()));
}

fn report(ui_tx: &Sender<UiEvent>, context: UiErrorContext, err: &ConsoleError) {
    tracing::warn!(?context, "{err}");
    emit_error(ui_tx, UiError::from_console_error(context, err));
}

fn emit_error(ui_tx: &Sender<UiEvent>, err: UiError) {
    emit(ui_tx, UiEvent::Error(err));
}

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.send(event).is_err() {
        tracing::debug!("prompt receiver dropped; event discarded");
    }
}
