use anyhow::Context;

/// Load `.env` (if any) and the layered configuration.
pub fn load_config() -> anyhow::Result<exm_config::ExamindConfig> {
    load_dotenv()?;
    exm_config::ExamindConfig::load().context("failed to load examind configuration")
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}
