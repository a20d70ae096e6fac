// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive chat shell.
//!
//! Drives the orchestrator turn by turn from the terminal, one inbound
//! message per line. Each line is a fully stateless turn against the
//! shared store, exactly like a message arriving over a channel.

use agendo_agent::{InboundTurn, Orchestrator};
use agendo_config::AgendoConfig;
use agendo_core::AgendoError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::wiring::build_context;

/// Runs the interactive chat loop until EOF or `/salir`.
pub async fn run_chat(
    config: AgendoConfig,
    business: String,
    user: String,
) -> Result<(), AgendoError> {
    let ctx = build_context(config).await?;
    let orchestrator = Orchestrator::new(ctx);

    let mut editor = DefaultEditor::new()
        .map_err(|e| AgendoError::Internal(format!("failed to start line editor: {e}")))?;

    println!("agendo chat - business {business}, user {user}");
    println!("escribe un mensaje, o /salir para terminar\n");

    loop {
        let line = match editor.readline("tú> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                return Err(AgendoError::Internal(format!("line editor failed: {e}")));
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "/salir" {
            break;
        }
        let _ = editor.add_history_entry(text);

        let turn = InboundTurn {
            from: user.clone(),
            to: business.clone(),
            text: text.to_string(),
        };
        match orchestrator.handle_turn(&turn).await {
            Ok(Some(reply)) => println!("\nagendo> {reply}\n"),
            Ok(None) => println!("\nagendo> (sin respuesta)\n"),
            Err(e) => eprintln!("\nagendo: error en el turno: {e}\n"),
        }
    }

    println!("hasta luego");
    Ok(())
}
