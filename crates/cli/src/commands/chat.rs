use bookxchange_core::assistant::Assistant;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::commands::{invalid_argument, CommandResult};

const COMMAND: &str = "chat";

#[derive(Debug, Clone, Default, Args)]
pub struct ChatArgs {
    #[arg(help = "Message for the assistant; omit to get the opening greeting")]
    pub message: Option<String>,
    #[arg(long, help = "Seed for reply selection")]
    pub seed: Option<u64>,
}

pub fn run(args: &ChatArgs) -> CommandResult {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let assistant = Assistant::new();

    let reply = match args.message.as_deref() {
        None => assistant.greeting(&mut rng),
        Some(message) if message.trim().is_empty() => {
            return invalid_argument(COMMAND, "message must not be blank");
        }
        Some(message) => assistant.reply(message, &mut rng),
    };
    debug!(event_name = "cli.chat.reply", intent = ?reply.intent, "assistant replied");

    CommandResult::success_with_data(COMMAND, reply.text.clone(), &reply)
}
