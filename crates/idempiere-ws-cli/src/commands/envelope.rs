//! `envelope` command: show the request without sending it

use super::ProcessArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{print_single, print_warning, OutputFormat};
use idempiere_ws_client::{EnvelopeBuilder, Parameter, TruncationAdvisory, UserContext};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct EnvelopeView<'a> {
    endpoint: &'a str,
    document: &'a str,
    advisories: &'a [TruncationAdvisory],
}

/// Build the request document with the password masked and print it
pub fn execute(args: ProcessArgs, config: &CliConfig, format: OutputFormat) -> CliResult<()> {
    let ctx = UserContext::from_value(&config.context_value())?;
    let params = Parameter::list_from_value(&args.params_value()?)?;

    let envelope = EnvelopeBuilder::new()
        .with_locale(config.client.locale.as_str())
        .build(&config.client.server, &args.process, &ctx.redacted(), &params)?;

    match format {
        OutputFormat::Text => {
            for advisory in envelope.advisories() {
                print_warning(&advisory.to_string());
            }
            println!("POST {}", envelope.endpoint());
            println!("{}", envelope.document());
        }
        _ => print_single(
            &EnvelopeView {
                endpoint: envelope.endpoint(),
                document: envelope.document(),
                advisories: envelope.advisories(),
            },
            format,
        )?,
    }

    Ok(())
}
