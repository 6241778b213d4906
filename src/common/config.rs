//! Global configuration.

use std::path::PathBuf;

use ansi_term::{Colour, Style};
use clap::Arg;
use rsmt2::SmtConf as SolverConf;

use crate::common::mk_dir;
use crate::errors::*;

/// Clap `App` with static lifetimes.
pub type App = ::clap::App<'static, 'static>;
/// Clap `ArgMatches` with static lifetime.
pub type Matches = ::clap::ArgMatches<'static>;

/// Functions all sub-configurations must have.
pub trait SubConf {
    /// True if the options of the subconf need the output directory.
    fn need_out_dir(&self) -> bool;
}

/// Factory configuration.
///
/// Currently, these options are static. They cannot be changed through clap.
pub struct InstanceConf {
    /// Initial capacity of the literal factory.
    pub term_capa: usize,
}
impl SubConf for InstanceConf {
    fn need_out_dir(&self) -> bool {
        false
    }
}
impl InstanceConf {
    /// Adds clap options to a clap App.
    pub fn add_args(app: App, _: usize) -> App {
        app
    }

    /// Creates itself from some matches.
    pub fn new(_: &Matches) -> Self {
        InstanceConf { term_capa: 3_000 }
    }
}

/// Solver configuration.
pub struct SmtConf {
    /// Actual solver configuration.
    conf: SolverConf,
    /// Smt logging flag.
    pub log: bool,
}
impl SubConf for SmtConf {
    fn need_out_dir(&self) -> bool {
        self.log
    }
}
impl SmtConf {
    /// Actual, `rsmt2` solver configuration.
    pub fn conf(&self) -> SolverConf {
        self.conf.clone()
    }

    /// Spawns a solver.
    ///
    /// If logging is active, will log to `<name>.smt2`.
    pub fn spawn<Parser>(&self, name: &'static str, parser: Parser) -> Res<::rsmt2::Solver<Parser>> {
        let mut solver = ::rsmt2::Solver::new(self.conf(), parser)?;
        if let Some(log) = self
            .log_file(name)
            .chain_err(|| format!("while opening log file for {}", crate::common::conf.emph(name)))?
        {
            solver.tee(log)?
        }
        Ok(solver)
    }

    /// Smt log dir, if any.
    fn log_dir(&self) -> Res<Option<PathBuf>> {
        if self.log {
            let mut path = crate::common::conf.out_dir();
            path.push("solvers");
            mk_dir(&path)?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    /// Smt log file, if any.
    fn log_file<S: AsRef<str>>(&self, name: S) -> Res<Option<::std::fs::File>> {
        use std::fs::OpenOptions;
        if let Some(mut path) = self.log_dir()? {
            path.push(name.as_ref());
            path.set_extension("smt2");
            let file = OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(&path)
                .chain_err(|| format!("while creating smt log file {}", path.to_string_lossy()))?;
            Ok(Some(file))
        } else {
            Ok(None)
        }
    }

    /// Adds clap options to a clap `App`.
    pub fn add_args(app: App, mut order: usize) -> App {
        let mut order = || {
            order += 1;
            order
        };

        app.arg(
            Arg::with_name("z3_cmd")
                .long("--z3")
                .help("sets the command used to call z3")
                .default_value("z3")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("smt_log")
                .long("--smt_log")
                .help("(de)activates smt logging to the output directory")
                .validator(bool_validator)
                .value_name(bool_format)
                .default_value("no")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
    }

    /// Creates itself from some matches.
    pub fn new(matches: &Matches) -> Self {
        let z3_cmd = matches
            .value_of("z3_cmd")
            .expect("unreachable(z3_cmd): default is provided")
            .to_string();
        let mut conf = SolverConf::z3(z3_cmd);
        conf.models();

        let log = bool_of_matches(matches, "smt_log");

        SmtConf { conf, log }
    }
}

/// Generalization strategy configuration.
pub struct GenConf {
    /// Heuristic drop policy, `1` to `6`.
    pub heuristic: usize,
    /// Calibration sample threshold for the heuristic policies.
    pub threshold: usize,
    /// Per-literal success ratio threshold for the heuristic policies.
    pub success_ratio: f64,
    /// Maximal number of consecutive failed drop attempts (`0` for
    /// unlimited).
    pub failure_limit: usize,
    /// Only try to drop literals mentioning arrays.
    pub array_only: bool,
    /// Activates literal expansion on failed drops.
    pub expansion: bool,
    /// Seed for the heuristic generalizer's rng.
    pub seed: u64,
    /// Address of the external decision service, if any.
    pub server: Option<String>,
    /// Sends applied generalizations to the decision service.
    pub send_lemmas: bool,
}
impl SubConf for GenConf {
    fn need_out_dir(&self) -> bool {
        false
    }
}
impl GenConf {
    /// Adds clap options to a clap `App`.
    pub fn add_args(app: App, mut order: usize) -> App {
        let mut order = || {
            order += 1;
            order
        };

        app.arg(
            Arg::with_name("gen_heuristic")
                .long("--gen_heuristic")
                .help("drop policy used by the heuristic generalizer (1 to 6)")
                .validator(|s| bounded_int_validator(s, 1, 6))
                .value_name("int")
                .default_value("2")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_threshold")
                .long("--gen_threshold")
                .help("calibration sample threshold for the heuristic generalizer")
                .validator(int_validator)
                .value_name("int")
                .default_value("100")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_ratio")
                .long("--gen_ratio")
                .help("per-literal success ratio threshold for the heuristic generalizer")
                .validator(float_validator)
                .value_name("float")
                .default_value("0.1")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_failure_limit")
                .long("--gen_failure_limit")
                .help("consecutive failed drops before giving up (0 for unlimited)")
                .validator(int_validator)
                .value_name("int")
                .default_value("0")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_array_only")
                .long("--gen_array_only")
                .help("only try to drop literals mentioning arrays")
                .validator(bool_validator)
                .value_name(bool_format)
                .default_value("no")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_expansion")
                .long("--gen_expansion")
                .help("try case-split expansions of literals that cannot be dropped")
                .validator(bool_validator)
                .value_name(bool_format)
                .default_value("no")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_seed")
                .long("--gen_seed")
                .help("seed for the heuristic generalizer's rng")
                .validator(int_validator)
                .value_name("int")
                .default_value("42")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_server")
                .long("--gen_server")
                .help("address of the external decision service (host:port)")
                .value_name("ADDR")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("gen_send_lemmas")
                .long("--gen_send_lemmas")
                .help("sends applied generalizations to the decision service")
                .validator(bool_validator)
                .value_name(bool_format)
                .default_value("no")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
    }

    /// Creates itself from some matches.
    pub fn new(matches: &Matches) -> Self {
        let heuristic = int_of_matches(matches, "gen_heuristic");
        let threshold = int_of_matches(matches, "gen_threshold");
        let success_ratio = float_of_matches(matches, "gen_ratio");
        let failure_limit = int_of_matches(matches, "gen_failure_limit");
        let array_only = bool_of_matches(matches, "gen_array_only");
        let expansion = bool_of_matches(matches, "gen_expansion");
        let seed = int_of_matches(matches, "gen_seed") as u64;
        let server = matches.value_of("gen_server").map(|s| s.to_string());
        let send_lemmas = bool_of_matches(matches, "gen_send_lemmas");

        GenConf {
            heuristic,
            threshold,
            success_ratio,
            failure_limit,
            array_only,
            expansion,
            seed,
            server,
            send_lemmas,
        }
    }
}

/// Global configuration.
pub struct Config {
    /// Verbosity.
    pub verb: usize,
    /// Statistics flag.
    pub stats: bool,
    /// Output directory.
    out_dir: String,
    /// Styles, for coloring.
    styles: Styles,

    /// Factory configuration.
    pub instance: InstanceConf,
    /// Solver configuration.
    pub solver: SmtConf,
    /// Generalization configuration.
    pub gen: GenConf,
}
impl ColorExt for Config {
    fn styles(&self) -> &Styles {
        &self.styles
    }
}
impl Config {
    /// Output directory as a `PathBuf`.
    #[inline]
    pub fn out_dir(&self) -> PathBuf {
        PathBuf::from(&self.out_dir)
    }

    /// Parses the process' arguments and generates the configuration.
    ///
    /// This crate is a library: when the process' arguments are not ours
    /// (a test harness for instance), falls back to the default values.
    pub fn clap() -> Self {
        let matches = match Self::mk_app().get_matches_from_safe(::std::env::args()) {
            Ok(matches) => matches,
            Err(_) => Self::mk_app().get_matches_from(vec!["lemgen"]),
        };
        Self::of_matches(&matches)
    }

    /// Builds the clap `App`.
    fn mk_app() -> App {
        let mut app = App::new(crate_name!())
            .version(crate_version!())
            .about("Lemma generalization for IC3/PDR-style Horn clause engines.");
        app = Self::add_args(app, 0);
        app = InstanceConf::add_args(app, 100);
        app = SmtConf::add_args(app, 200);
        app = GenConf::add_args(app, 300);
        app
    }

    /// Creates itself from some matches.
    fn of_matches(matches: &Matches) -> Self {
        // Verbosity.
        let mut verb = 0;
        for _ in 0..matches.occurrences_of("verb") {
            verb += 1
        }
        for _ in 0..matches.occurrences_of("quiet") {
            if verb > 0 {
                verb -= 1
            }
        }

        // Colors.
        let color = ::atty::is(::atty::Stream::Stdout) && bool_of_matches(matches, "color");
        let styles = Styles::new(color);

        // Output directory.
        let out_dir = matches
            .value_of("out_dir")
            .expect("unreachable(out_dir): default is provided")
            .to_string();

        // Profiling.
        let stats = bool_of_matches(matches, "stats");

        let instance = InstanceConf::new(matches);
        let solver = SmtConf::new(matches);
        let gen = GenConf::new(matches);

        Config {
            verb,
            stats,
            out_dir,
            styles,
            instance,
            solver,
            gen,
        }
    }

    /// Adds clap options to a clap `App`.
    fn add_args(app: App, mut order: usize) -> App {
        let mut order = || {
            order += 1;
            order
        };

        app.arg(
            Arg::with_name("verb")
                .short("-v")
                .help("increases verbosity")
                .multiple(true)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("quiet")
                .short("-q")
                .help("decreases verbosity")
                .multiple(true)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("color")
                .long("--color")
                .help("(de)activates coloring (off if output is not a tty)")
                .validator(bool_validator)
                .value_name(bool_format)
                .default_value("on")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("stats")
                .long("--stats")
                .help("reports some statistics at the end of the run")
                .validator(bool_validator)
                .value_name(bool_format)
                .default_value("no")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::with_name("out_dir")
                .long("--out_dir")
                .help("sets the output directory (used by smt logging)")
                .value_name("DIR")
                .default_value("lemgen_out")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
    }
}

/// Contains some styles for coloring.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Emphasis style.
    emph: Style,
    /// Happy style.
    hap: Style,
    /// Sad style.
    sad: Style,
    /// Bad style.
    bad: Style,
}
impl Default for Styles {
    fn default() -> Self {
        Styles::new(true)
    }
}
impl ColorExt for Styles {
    fn styles(&self) -> &Styles {
        self
    }
}
impl Styles {
    /// Creates some styles.
    pub fn new(colored: bool) -> Self {
        Styles {
            emph: if colored {
                Style::new().bold()
            } else {
                Style::new()
            },
            hap: if colored {
                Colour::Green.normal().bold()
            } else {
                Style::new()
            },
            sad: if colored {
                Colour::Yellow.normal().bold()
            } else {
                Style::new()
            },
            bad: if colored {
                Colour::Red.normal().bold()
            } else {
                Style::new()
            },
        }
    }
}

/// Can color things.
pub trait ColorExt {
    /// The styles in the colorizer: emph, happy, sad, and bad.
    #[inline]
    fn styles(&self) -> &Styles;
    /// String emphasis.
    #[inline]
    fn emph<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().emph.paint(s.as_ref()))
    }
    /// Happy string.
    #[inline]
    fn happy<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().hap.paint(s.as_ref()))
    }
    /// Sad string.
    #[inline]
    fn sad<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().sad.paint(s.as_ref()))
    }
    /// Bad string.
    #[inline]
    fn bad<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().bad.paint(s.as_ref()))
    }
}

/// Format for booleans.
pub static bool_format: &str = "on/true|no/off/false";

/// Boolean of a string.
pub fn bool_of_str(s: &str) -> Option<bool> {
    match s {
        "on" | "true" => Some(true),
        "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

/// Boolean of some matches.
///
/// Assumes a default is provided and the input has been validated with
/// `bool_validator`.
pub fn bool_of_matches(matches: &Matches, key: &str) -> bool {
    matches
        .value_of(key)
        .and_then(bool_of_str)
        .expect("failed to retrieve boolean argument")
}

/// Integer of some matches.
///
/// Assumes a default is provided and the input has been validated with
/// `int_validator`.
pub fn int_of_matches(matches: &Matches, key: &str) -> usize {
    use std::str::FromStr;
    matches
        .value_of(key)
        .map(usize::from_str)
        .expect("failed to retrieve integer argument")
        .expect("failed to retrieve integer argument")
}

/// Float of some matches.
///
/// Assumes a default is provided and the input has been validated with
/// `float_validator`.
pub fn float_of_matches(matches: &Matches, key: &str) -> f64 {
    use std::str::FromStr;
    matches
        .value_of(key)
        .map(f64::from_str)
        .expect("failed to retrieve float argument")
        .expect("failed to retrieve float argument")
}

/// Validates boolean input.
pub fn bool_validator(s: String) -> Result<(), String> {
    if bool_of_str(&s).is_some() {
        Ok(())
    } else {
        Err(format!("expected `on/true` or `off/false`, got `{}`", s))
    }
}

/// Validates integer input.
pub fn int_validator(s: String) -> Result<(), String> {
    use std::str::FromStr;
    match usize::from_str(&s) {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("expected an integer, got `{}`", s)),
    }
}

/// Validates integer input between some bounds.
pub fn bounded_int_validator(s: String, lo: usize, hi: usize) -> Result<(), String> {
    use std::str::FromStr;
    match usize::from_str(&s) {
        Ok(val) => {
            if lo <= val && val <= hi {
                Ok(())
            } else {
                Err(format!(
                    "expected a value between {} and {}, got `{}`",
                    lo, hi, val
                ))
            }
        }
        Err(_) => Err(format!("expected an integer, got `{}`", s)),
    }
}

/// Validates float input.
pub fn float_validator(s: String) -> Result<(), String> {
    use std::str::FromStr;
    match f64::from_str(&s) {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("expected a float, got `{}`", s)),
    }
}
