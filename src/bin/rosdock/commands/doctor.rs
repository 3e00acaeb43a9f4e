//! `rosdock doctor` command

use anyhow::Result;

use rosdock::ops::{doctor, format_report, Project};
use rosdock::util::config::Config;
use rosdock::util::GlobalContext;

pub fn execute(verbose: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;

    // Outside a recipe directory only the global config applies
    let (config, toolchain_file) = match Project::load(&ctx) {
        Ok(project) => {
            let toolchain = project.toolchain_file();
            (project.config().clone(), toolchain)
        }
        Err(_) => {
            let config = ctx
                .config_path()
                .map(|p| Config::load_or_default(&p))
                .unwrap_or_default();
            (config, None)
        }
    };

    let report = doctor(&config, toolchain_file.as_deref());
    print!("{}", format_report(&report, verbose));

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
