//! Service (scene) listing and invocation.

use serde::Serialize;
use tabled::Tabled;

use smartif_api::{SmartIfClient, service_slug};

use crate::cli::{GlobalOpts, ServicesArgs, ServicesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct ServiceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
}

impl ServiceRow {
    fn new(name: String) -> Self {
        let endpoint = format!("Services/{}", service_slug(&name));
        Self { name, endpoint }
    }
}

pub async fn handle(
    args: ServicesArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ServicesCommand::List => {
            let services: Vec<ServiceRow> = client
                .list_services()
                .await?
                .into_iter()
                .map(ServiceRow::new)
                .collect();
            let out = output::render_list(
                global.output,
                &services,
                ServiceRow::clone,
                |s| s.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ServicesCommand::Call { name } => {
            client.call_service(&name).await?;
            if !global.quiet {
                eprintln!("called {name}");
            }
            Ok(())
        }
    }
}
