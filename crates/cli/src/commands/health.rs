use crate::commands::{client_failure, intake_client, runtime, CommandResult};

const COMMAND: &str = "health";

pub fn run(base_url: Option<String>) -> CommandResult {
    let client = match intake_client(COMMAND, base_url) {
        Ok(client) => client,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    match runtime.block_on(client.health()) {
        Ok(health) if health.status == "ok" => CommandResult::success_with_data(
            COMMAND,
            format!("intake service at {} is up", client.base_url()),
            &health,
        ),
        Ok(health) => CommandResult::failure(
            COMMAND,
            "unhealthy",
            format!("intake service reported status `{}`", health.status),
            6,
        ),
        Err(error) => client_failure(COMMAND, &error),
    }
}
