//! Terminal rendering of outbound messages.

use console::style;

use frontis_types::message::Outbound;

pub fn render_outbound(messages: &[Outbound]) {
    for message in messages {
        match message {
            Outbound::Typing => {}
            Outbound::Text { text } => {
                println!("{} {}", style("bot>").cyan().bold(), text);
            }
            Outbound::SuggestedActions { text, actions } => {
                println!("{} {}", style("bot>").cyan().bold(), text);
                let chips = actions
                    .iter()
                    .map(|a| format!("[{a}]"))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("     {}", style(chips).dim());
            }
            Outbound::HomeworkCard { card } => {
                println!(
                    "{} {}",
                    style("bot>").cyan().bold(),
                    style(&card.exercise).bold()
                );
                println!("     {}, σελ. {}", card.book, card.page);
                if let Some(grade) = &card.grade {
                    println!("     Βαθμός: {grade}");
                }
                println!("     Σχόλια: {}", card.notes);
            }
        }
    }
}
