//! Browser session for a live run

use formfill::{CdpPage, CdpSession, LaunchOptions};
use tracing::info;

use crate::commands::RunArgs;
use crate::error::CliResult;

/// Launch options for `args`; the window shows unless `--headless`
#[must_use]
pub fn launch_options(args: &RunArgs) -> LaunchOptions {
    let mut options = LaunchOptions::default()
        .with_headed(!args.headless)
        .with_no_sandbox(args.no_sandbox);
    if let Some(bin) = &args.browser_bin {
        options = options.with_executable(bin);
    }
    if let Some(profile) = &args.profile {
        options = options.with_profile_dir(profile);
    }
    options
}

/// Launch the browser and open `url`
pub fn open_form(args: &RunArgs, url: &str) -> CliResult<(CdpSession, CdpPage)> {
    let options = launch_options(args);
    info!(headed = options.headed, url, "Launching browser");
    let session = CdpSession::launch(&options)?;
    let page = session.open(url)?;
    Ok((session, page))
}
