//! pdscviz CLI
//!
//! Visualizes dependencies between Pegasus Data Schema (PDSC) files using
//! GraphViz.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pdsc_graph::graph::{cycles, load_from_directory, search, DependencyGraph, DisplayEdge};
use pdsc_graph::{render_dot, RenderOptions, VizConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdscviz")]
#[command(about = "Visualize dependencies between PDSC files using GraphViz")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to load on top of the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory to scan for PDSC files
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Output file (`-` for stdout)
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Prefix to remove from each type name
    #[arg(long, global = true)]
    trim_prefix: Option<String>,

    /// Extra attributes for the graph (see http://www.graphviz.org/content/attrs)
    #[arg(long, global = true)]
    graph_attrs: Option<String>,

    /// Leave out edges whose DOT statement matches this regex
    #[arg(long, global = true)]
    exclude: Option<String>,

    /// Follow at most this many edges from the root
    #[arg(long, global = true)]
    depth: Option<usize>,

    /// Without a command, graphs all models
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Graph all models that transitively depend on <ROOT>
    Usages {
        root: String,
    },

    /// Graph all models that <ROOT> transitively depends on
    Dependencies {
        root: String,
    },

    /// List groups of models that reference each other
    Cycles,

    /// Write a config file with the default settings
    InitConfig {
        /// Output path (`-o` is the global `--out`)
        #[arg(long, default_value = "pdscviz.toml")]
        output: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("fatal: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Commands::InitConfig { output }) = &cli.command {
        VizConfig::default()
            .save(output)
            .with_context(|| format!("failed to write {}", output))?;
        tracing::info!(path = %output, "created config file");
        return Ok(());
    }

    let config = apply_overrides(VizConfig::load_from(cli.config.as_deref())?, &cli);
    let exclude = config.exclude_regex().context("invalid --exclude pattern")?;

    let graph = load_from_directory(&config.scan.dir, &config.load_config(), &config.render.trim_prefix)
        .with_context(|| format!("finished walking {} with error", config.scan.dir.display()))?;

    let (edges, root) = match &cli.command {
        Some(Commands::Usages { root }) => {
            let key = lookup_root(&graph, root);
            (graph.collect_usages(&key, cli.depth), Some(graph.display_name(&key).to_string()))
        }
        Some(Commands::Dependencies { root }) => {
            let key = lookup_root(&graph, root);
            (graph.collect_dependencies(&key, cli.depth), Some(graph.display_name(&key).to_string()))
        }
        Some(Commands::Cycles) => {
            print_cycles(&graph);
            return Ok(());
        }
        Some(Commands::InitConfig { .. }) | None => (graph.collect_all(), None),
    };

    let options = RenderOptions {
        graph_attrs: config.render.graph_attrs.clone(),
        root,
        exclude,
    };
    write_output(&config, &edges, &options)
}

fn apply_overrides(mut config: VizConfig, cli: &Cli) -> VizConfig {
    if let Some(dir) = &cli.dir {
        config.scan.dir = dir.clone();
    }
    if let Some(out) = &cli.out {
        config.render.out = out.clone();
    }
    if let Some(prefix) = &cli.trim_prefix {
        config.render.trim_prefix = prefix.clone();
    }
    if let Some(attrs) = &cli.graph_attrs {
        config.render.graph_attrs = Some(attrs.clone());
    }
    if let Some(exclude) = &cli.exclude {
        config.render.exclude = Some(exclude.clone());
    }
    config
}

/// Resolve a root argument, suggesting close names when it is unknown
fn lookup_root(graph: &DependencyGraph, root: &str) -> String {
    let key = graph.resolve_root(root);
    if !graph.contains(&key) {
        tracing::warn!(root, "no edges reference this type");
        for candidate in search(graph, root, 3) {
            tracing::info!("did you mean {}?", graph.display_name(&candidate.name));
        }
    }
    key
}

fn print_cycles(graph: &DependencyGraph) {
    let groups = cycles(graph);
    if groups.is_empty() {
        println!("no cycles");
        return;
    }
    for group in groups {
        let names: Vec<&str> = group.iter().map(|n| graph.display_name(n)).collect();
        println!("{}", names.join(" <-> "));
    }
}

fn write_output(config: &VizConfig, edges: &[DisplayEdge], options: &RenderOptions) -> anyhow::Result<()> {
    let dot = render_dot(edges, options);

    if config.writes_stdout() {
        print!("{}", dot);
        return Ok(());
    }

    let out = &config.render.out;
    std::fs::write(out, dot).with_context(|| format!("failed to write file {}", out.display()))?;
    tracing::info!("wrote graph to {}", out.display());

    let layout = if options.root.is_some() { "twopi" } else { "dot" };
    tracing::info!("cat {} | {} -Tpng > /tmp/pdsc.png && open /tmp/pdsc.png", out.display(), layout);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pdsc_graph::graph::LoadConfig;
    use std::path::Path;
    use tempfile::TempDir;

    fn fixtures_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/schemas")
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pdscviz").chain(args.iter().copied())).unwrap()
    }

    /// Run against the fixture tree and return the written DOT
    fn run_to_file(args: &[&str]) -> String {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("graph.dot");
        let fixtures = fixtures_path();
        let mut full = vec!["--dir", fixtures.to_str().unwrap(), "--out", out.to_str().unwrap()];
        full.extend_from_slice(args);

        run(parse(&full)).unwrap();
        std::fs::read_to_string(&out).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_usages() {
        let cli = parse(&["usages", "Foo", "--trim-prefix", "com.example.", "--depth", "1", "--out", "-"]);
        assert!(matches!(&cli.command, Some(Commands::Usages { root }) if root == "Foo"));
        assert_eq!(cli.depth, Some(1));
        assert_eq!(cli.trim_prefix.as_deref(), Some("com.example."));
        assert_eq!(cli.out, Some(PathBuf::from("-")));
    }

    #[test]
    fn test_parse_other_commands() {
        assert!(matches!(
            parse(&["dependencies", "Profile"]).command,
            Some(Commands::Dependencies { root }) if root == "Profile"
        ));
        assert!(matches!(parse(&["cycles"]).command, Some(Commands::Cycles)));
        assert!(parse(&[]).command.is_none());

        let cli = parse(&["init-config", "--output", "x.toml", "-o", "graph.dot"]);
        assert!(matches!(&cli.command, Some(Commands::InitConfig { output }) if output == "x.toml"));
        assert_eq!(cli.out, Some(PathBuf::from("graph.dot")));

        let cli = parse(&["init-config"]);
        assert!(matches!(&cli.command, Some(Commands::InitConfig { output }) if output == "pdscviz.toml"));
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = VizConfig::default();
        config.render.trim_prefix = "org.other.".to_string();
        config.render.exclude = Some("Old".to_string());

        let cli = parse(&[
            "--dir", "schemas",
            "--out", "-",
            "--trim-prefix", "com.example.",
            "--graph-attrs", "ranksep=3",
            "--exclude", "Audit",
        ]);
        let config = apply_overrides(config, &cli);

        assert_eq!(config.scan.dir, PathBuf::from("schemas"));
        assert!(config.writes_stdout());
        assert_eq!(config.render.trim_prefix, "com.example.");
        assert_eq!(config.render.graph_attrs.as_deref(), Some("ranksep=3"));
        assert_eq!(config.render.exclude.as_deref(), Some("Audit"));
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = VizConfig::default();
        config.render.trim_prefix = "com.example.".to_string();

        let config = apply_overrides(config, &parse(&["cycles"]));
        assert_eq!(config.render.trim_prefix, "com.example.");
        assert_eq!(config.render.out, PathBuf::from("/tmp/pdsc.dot"));
    }

    #[test]
    fn test_lookup_root_accepts_display_name() {
        let graph = load_from_directory(&fixtures_path(), &LoadConfig::default(), "com.example.").unwrap();
        assert_eq!(lookup_root(&graph, "Foo"), "com.example.Foo");
        assert_eq!(lookup_root(&graph, "com.example.Foo"), "com.example.Foo");
        assert_eq!(lookup_root(&graph, "Missing"), "Missing");
    }

    #[test]
    fn test_run_usages_with_depth() {
        let dot = run_to_file(&["usages", "Foo", "--trim-prefix", "com.example.", "--depth", "1"]);
        assert!(dot.contains("  root=\"Foo\";\n"));
        assert!(dot.contains("\"Profile\"->\"Foo\" [color=\"#ff0000\"];"));
        assert!(!dot.contains("Auditable"));
    }

    #[test]
    fn test_run_dependencies_with_exclude() {
        let dot = run_to_file(&[
            "dependencies", "Profile",
            "--trim-prefix", "com.example.",
            "--depth", "1",
            "--exclude", "Urn",
        ]);
        assert!(dot.contains("  root=\"Profile\";\n"));
        assert!(dot.contains("\"Profile\"->\"Auditable\" [];"));
        assert!(!dot.contains("Urn"));
    }

    #[test]
    fn test_run_all_edges() {
        let dot = run_to_file(&["--trim-prefix", "com.example."]);
        assert!(!dot.contains("root="));
        assert!(dot.contains("\"Foo\"->\"Bar\" [];"));
        assert!(dot.contains("\"Node\"->\"Node\" [];"));
    }

    #[test]
    fn test_run_cycles_and_stdout() {
        let fixtures = fixtures_path();
        let dir = fixtures.to_str().unwrap();
        run(parse(&["cycles", "--dir", dir])).unwrap();
        run(parse(&["usages", "Foo", "--dir", dir, "--out", "-"])).unwrap();
    }

    #[test]
    fn test_run_invalid_exclude() {
        let fixtures = fixtures_path();
        let err = run(parse(&["--dir", fixtures.to_str().unwrap(), "--out", "-", "--exclude", "("])).unwrap_err();
        assert!(err.to_string().contains("invalid --exclude pattern"));
    }

    #[test]
    fn test_run_init_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pdscviz.toml");
        run(parse(&["init-config", "--output", path.to_str().unwrap()])).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[scan]"));
        assert!(written.contains("[render]"));
        let config = VizConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.scan.extension, "pdsc");
    }
}
