#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use serde::Deserialize;
use std::{env, fs, path::Path};
use lazy_static::lazy_static;
use structopt::StructOpt;

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

// Greeter Utilities
use crate::utils::{greeter_utils::get_absolute_path, errors::Errors};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Environment variables take precedence over command line arguments.
const ENV_CONFIG_FILE      : &str = "GREETER_CONFIG_FILE";
const ENV_LOG_CONFIG       : &str = "GREETER_LOG_CONFIG";
const DEFAULT_CONFIG_FILE  : &str = "~/.greeter/greeter.toml";
const DEFAULT_LOG_CONFIG   : &str = "~/.greeter/log4rs.yml";

// Console logging used when no log4rs file is available.
const DEFAULT_LOG_PATTERN  : &str = "{d(%Y-%m-%dT%H:%M:%S%.3f%Z)} {l} {t} - {m}{n}";
const STDOUT_APPENDER      : &str = "stdout";

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "0.0.0.0";
const DEFAULT_HTTP_PORT    : u16  = 8080;
const DEFAULT_SHUTDOWN_SECS: u64  = 5;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref GREETER_ARGS: GreeterArgs = init_greeter_args();
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// GreeterArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "greeter_args", about = "Command line arguments for Greeter Server.")]
pub struct GreeterArgs {
    /// Path of the TOML configuration file.
    ///
    /// The file is located using the following priority order:
    ///
    ///   1. If set, the value of the GREETER_CONFIG_FILE environment variable,
    ///
    ///   2. Otherwise, if set, the value of this argument,
    ///
    ///   3. Otherwise, ~/.greeter/greeter.toml
    ///
    /// Default values are used when the file does not exist.
    #[structopt(short, long)]
    pub config_file: Option<String>,

    /// Path of the log4rs YAML configuration file.
    ///
    /// Resolved like --config-file using GREETER_LOG_CONFIG and
    /// ~/.greeter/log4rs.yml.  Console logging at INFO level is used when
    /// the file does not exist.
    #[structopt(short, long)]
    pub log_config: Option<String>,

    /// Print the service's OpenAPI document as YAML and then exit.
    #[structopt(short, long)]
    pub print_openapi: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub greeter_args: &'static GreeterArgs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// The socket address the server listens on.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.http_addr, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Greeter Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_SECS,
        }
    }
}

// ***************************************************************************
//                            Argument Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_greeter_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_greeter_args() -> GreeterArgs {
    let args = GreeterArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// resolve_path:
// ---------------------------------------------------------------------------
/** Pick a file path by precedence: environment variable, then command line
 * argument, then the default.  The result is expanded and absolute.
 */
fn resolve_path(env_var: &str, arg: &Option<String>, default: &str) -> String {
    let path = env::var(env_var).unwrap_or_else(
        |_| {
            match arg.clone() {
                Some(p) => p,
                None => default.to_string(),
            }
        });

    get_absolute_path(&path)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from its YAML file if one exists, otherwise from a
 * console configuration built here.
 */
pub fn init_log() -> Result<()> {
    let logconfig = resolve_path(ENV_LOG_CONFIG, &GREETER_ARGS.log_config, DEFAULT_LOG_CONFIG);
    if Path::new(&logconfig).is_file() {
        if let Err(e) = log4rs::init_file(&logconfig, Default::default()) {
            return Err(anyhow!("{}\n   {}", Errors::Log4rsInitialization(logconfig), e));
        }
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        let config = default_log_config()?;
        if let Err(e) = log4rs::init_config(config) {
            return Err(anyhow!("{}\n   {}", Errors::Log4rsInitialization("console".to_string()), e));
        }
        info!("Log4rs initialized using console defaults, no file at: {}", logconfig);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// default_log_config:
// ---------------------------------------------------------------------------
fn default_log_config() -> Result<LogConfig> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
        .build();

    let config = LogConfig::builder()
        .appender(Appender::builder().build(STDOUT_APPENDER, Box::new(stdout)))
        .build(Root::builder().appender(STDOUT_APPENDER).build(LevelFilter::Info))?;
    Ok(config)
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file.  A
 * missing file yields the default configuration, an unparsable one is an
 * error.
 */
fn get_parms() -> Result<Parms> {
    let config_file = resolve_path(ENV_CONFIG_FILE, &GREETER_ARGS.config_file, DEFAULT_CONFIG_FILE);

    info!("{}", Errors::ReadingConfigFile(config_file.clone()));
    let contents = match fs::read_to_string(&config_file) {
        Ok(c) => c,
        Err(_) => {
            info!("Unable to read configuration at {}. Using default values.", config_file);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    let config = parse_config(&contents, &config_file)?;
    Ok(Parms { config_file, config })
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c)  => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> Result<RuntimeCtx> {
    let parms = get_parms()?;
    Ok(RuntimeCtx {parms, greeter_args: &GREETER_ARGS})
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::new();
        assert_eq!(config.http_addr, "0.0.0.0");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.shutdown_timeout_secs, 5);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = parse_config("http_port = 9000\n", "test.toml").unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(config.title, "Greeter Server");
    }

    #[test]
    fn sample_config_parses() {
        let contents = include_str!("../../resources/greeter.toml");
        let config = parse_config(contents, "greeter.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_toml_is_an_error() {
        let err = parse_config("http_port = \"eighty\"", "bad.toml").unwrap_err();
        assert!(err.to_string().contains("Unable to parse TOML file: bad.toml"));
    }

    #[test]
    fn env_var_wins_over_argument() {
        let var = "GREETER_TEST_RESOLVE_PATH";
        env::set_var(var, "/from/env.toml");
        let p = resolve_path(var, &Some("/from/arg.toml".to_string()), "/default.toml");
        env::remove_var(var);
        assert_eq!(p, "/from/env.toml");
    }

    #[test]
    fn argument_wins_over_default() {
        let p = resolve_path("GREETER_TEST_UNSET_VAR", &Some("/from/arg.toml".to_string()), "/default.toml");
        assert_eq!(p, "/from/arg.toml");
        let p = resolve_path("GREETER_TEST_UNSET_VAR", &None, "/default.toml");
        assert_eq!(p, "/default.toml");
    }

    #[test]
    fn console_log_config_builds() {
        assert!(default_log_config().is_ok());
    }
}
