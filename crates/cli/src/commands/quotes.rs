use crate::commands::{client_failure, intake_client, runtime, CommandResult};

const COMMAND: &str = "quotes";

pub fn run(id: Option<String>, base_url: Option<String>) -> CommandResult {
    let client = match intake_client(COMMAND, base_url) {
        Ok(client) => client,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    match id {
        Some(id) => match runtime.block_on(client.get_quote(&id)) {
            Ok(quote) => CommandResult::success_with_data(
                COMMAND,
                format!("quote {} for {}", quote.id, quote.company_name),
                &quote,
            ),
            Err(error) => client_failure(COMMAND, &error),
        },
        None => match runtime.block_on(client.list_quotes()) {
            Ok(quotes) => CommandResult::success_with_data(
                COMMAND,
                format!("{} quote(s) stored", quotes.len()),
                &quotes,
            ),
            Err(error) => client_failure(COMMAND, &error),
        },
    }
}
