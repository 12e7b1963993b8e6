use crate::engine::merge::AggregatorOptions;
use crate::engine::pipeline::PipelineConfig;
use crate::engine::regroup::{PrefixRule, RuleSet};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "JERC_MERGE_CONFIG";
pub const ENV_PREFIX: &str = "JERC_MERGE";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub paths: PathsConfig,
    pub run: RunConfig,
    pub merge: MergeConfig,
    pub validate: ValidateConfig,
    pub check: CheckConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rules: Vec<ChannelRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Root of the per-channel histogram trees
    pub hist_dir: PathBuf,
    /// Job manifests and every manifest written by a run
    pub manifest_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub channels: Vec<String>,
    pub years: Vec<String>,
    pub run_period: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    pub workers: Option<usize>,
    /// Per combiner invocation; 0 disables the limit
    pub timeout_secs: u64,
    pub combiner_program: String,
    pub combiner_args: Vec<String>,
    pub file_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateConfig {
    pub hist_locator: String,
    pub tolerance: f64,
    pub extractor_program: Option<String>,
    #[serde(default)]
    pub extractor_args: Vec<String>,
    pub not_found_exit_code: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub min_size_bytes: u64,
    pub cutflow_locator: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

/// One regroup rule. Channel is a value rather than a table key so its
/// case survives loading.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRule {
    pub channel: String,
    pub prefix: String,
    pub replacement: String,
}

impl Settings {
    /// Rules grouped per channel, in file order.
    pub fn rule_set(&self) -> RuleSet {
        let mut set = RuleSet::default();
        for rule in &self.rules {
            let mut rules = set.rules_for(&rule.channel).to_vec();
            rules.push(PrefixRule::new(&rule.prefix, &rule.replacement));
            set = set.with_channel(&rule.channel, rules);
        }
        set
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            hist_dir: self.paths.hist_dir.clone(),
            manifest_dir: self.paths.manifest_dir.clone(),
            channels: self.run.channels.clone(),
            years: self.run.years.clone(),
            run_period: self.run.run_period.clone(),
            file_template: self.merge.file_template.clone(),
            rules: self.rule_set(),
        }
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        let mut options = AggregatorOptions::default();
        if let Some(workers) = self.merge.workers {
            options.workers = workers.max(1);
        }
        if self.merge.timeout_secs > 0 {
            options.timeout = Some(Duration::from_secs(self.merge.timeout_secs));
        }
        options
    }

    /// Makes the tree and manifest roots absolute against the working
    /// directory so manifests record paths usable from anywhere.
    pub fn absolutize_paths(&mut self) {
        self.paths.hist_dir = absolutize(&self.paths.hist_dir);
        self.paths.manifest_dir = absolutize(&self.paths.manifest_dir);
    }

    /// Narrows the configured channels and years to the given filters.
    /// Empty filters keep everything.
    pub fn narrow(&mut self, channels: &[String], years: &[String]) {
        if !channels.is_empty() {
            self.run.channels.retain(|c| channels.contains(c));
        }
        if !years.is_empty() {
            self.run.years.retain(|y| years.contains(y));
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Compiled-in defaults, then the config file, then `JERC_MERGE__SECTION__KEY`
/// environment overrides. The file is `path` if given (and then required),
/// else `$JERC_MERGE_CONFIG`, else an optional `config.toml`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    let (config_path, required) = match path {
        Some(p) => (p.to_string_lossy().into_owned(), true),
        None => match env::var(CONFIG_ENV) {
            Ok(p) => (p, true),
            Err(_) => (DEFAULT_CONFIG_FILE.to_string(), false),
        },
    };

    let settings: Settings = config::Config::builder()
        .set_default("paths.hist_dir", "Hist")?
        .set_default("paths.manifest_dir", "input/json")?
        .set_default("run.channels", vec!["ZeeJet", "ZmmJet", "GamJet"])?
        .set_default("run.years", vec!["2016Pre", "2016Post", "2017", "2018"])?
        .set_default("run.run_period", "Run2")?
        .set_default("merge.timeout_secs", 3600_i64)?
        .set_default("merge.combiner_program", "hadd")?
        .set_default("merge.combiner_args", vec!["-f", "-k"])?
        .set_default("merge.file_template", "{group}_Hist_Merged.root")?
        .set_default(
            "validate.hist_locator",
            "Base/passExactly1Ref/HistRef/h1EventInRefPt",
        )?
        .set_default("validate.tolerance", 1e-6)?
        .set_default("validate.not_found_exit_code", 2_i64)?
        .set_default("check.min_size_bytes", 3000_i64)?
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .add_source(config::File::with_name(&config_path).required(required))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
