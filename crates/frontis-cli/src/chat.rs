//! Interactive chat loop.
//!
//! Reads lines from stdin and feeds them to the engine. Slash commands
//! control the session; everything else is a turn of the active dialog.

use std::io::Write;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use frontis_core::clock::Clock;
use frontis_core::engine::DialogEngine;
use frontis_core::repository::DomainRepository;
use frontis_core::state::StateStore;
use frontis_types::domain::{ConversationId, StudentId};

use crate::render::render_outbound;

pub async fn run<R, S, C>(
    engine: DialogEngine<R, S, C>,
    conversation: ConversationId,
    student: StudentId,
) -> anyhow::Result<()>
where
    R: DomainRepository,
    S: StateStore,
    C: Clock,
{
    println!(
        "{} conversation {}",
        style("frontis").cyan().bold(),
        style(conversation).dim()
    );
    println!(
        "{}",
        style("/start begins the homework flow, /cancel abandons it, /quit exits").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", style("you>").green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        let outbound = match line {
            "" => continue,
            "/quit" | "/q" => break,
            "/start" => engine.start(conversation, student).await?,
            "/cancel" => engine.abandon(conversation, student).await?,
            text => engine.handle_turn(conversation, student, text).await?,
        };
        render_outbound(&outbound);
    }

    Ok(())
}
