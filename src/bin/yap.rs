//! Thin CLI wrapper: parses arguments, calls into the `yap` library, and
//! is the only place in the crate allowed to call `std::process::exit`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use yap::workspace::scheduler::NodeOutcome;
use yap::{BuildOptions, Workspace};

#[derive(Parser)]
#[command(name = "yap", about = "Build APK/DEB/RPM/Pacman packages from PKGBUILD recipes", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging (equivalent to RUST_LOG=debug)
    #[arg(long, global = true)]
    verbose: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build one or more workspace projects
    Build {
        /// Target distribution or package manager, e.g. "debian", "fedora", "arch"
        distro: String,
        /// Workspace root (defaults to the current directory)
        path: Option<PathBuf>,

        /// Remove each project's build directory before starting
        #[arg(long)]
        cleanbuild: bool,
        /// Skip the build()/package() lifecycle scripts, packaging only
        #[arg(long)]
        nobuild: bool,
        /// Skip installing make dependencies before building
        #[arg(long)]
        nomakedeps: bool,
        /// Skip refreshing the host package-manager index
        #[arg(long)]
        skip_sync: bool,
        /// Override pkgver for every built project
        #[arg(long)]
        pkgver: Option<String>,
        /// Override pkgrel for every built project
        #[arg(long)]
        pkgrel: Option<String>,
        /// Start the build range at this project name (inclusive)
        #[arg(long)]
        from: Option<String>,
        /// End the build range at this project name (inclusive)
        #[arg(long)]
        to: Option<String>,
        /// Passphrase for the default SSH key, for git+ssh sources
        #[arg(long)]
        ssh_password: Option<String>,
    },
    /// Refresh the host package-manager index for a distribution
    Prepare { distro: String },
    /// Install build dependencies for a distribution without building
    Pull { distro: String },
    /// Remove a workspace project's build directory
    Zap { distro: String, path: PathBuf },
    /// Print the workspace dependency graph as resolved SRCINFO-style text
    Graph { path: Option<PathBuf> },
    /// Show each project's position in the dependency graph and whether
    /// it has a build directory left over from a previous run
    Status { path: Option<PathBuf> },
    /// List distribution names this binary recognizes
    ListDistros,
    /// Print version information
    Version,
}

fn init_logging(verbose: bool, no_color: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "info" }),
    );
    builder.write_style(if no_color { env_logger::WriteStyle::Never } else { env_logger::WriteStyle::Auto });
    builder.init();
}

fn workspace_root(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| std::env::current_dir().expect("current directory must be readable"))
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.no_color);

    let exit_code = match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: Command) -> yap::Result<i32> {
    match command {
        Command::Build {
            distro,
            path,
            cleanbuild,
            nobuild,
            nomakedeps,
            skip_sync,
            pkgver,
            pkgrel,
            from,
            to,
            ssh_password,
        } => {
            let root = workspace_root(path);
            let workspace = Workspace::load(&root)?;
            let options = BuildOptions {
                distro,
                codename: String::new(),
                clean_build: cleanbuild,
                skip_sync,
                no_build: nobuild,
                no_make_deps: nomakedeps,
                from,
                to,
                ssh_passphrase: ssh_password,
                pkgver_override: pkgver,
                pkgrel_override: pkgrel,
                install_successors: true,
            };
            let artifacts_root = root.clone();
            let outcomes = workspace.build_all(&artifacts_root, &options)?;

            let mut failed = Vec::new();
            let mut skipped = Vec::new();
            for (name, outcome) in &outcomes {
                match outcome {
                    NodeOutcome::Failed(message) => {
                        log::error!("project '{name}' failed: {message}");
                        failed.push(name.clone());
                    }
                    NodeOutcome::Skipped => skipped.push(name.clone()),
                    NodeOutcome::Success => log::info!("project '{name}' built successfully"),
                }
            }
            if !skipped.is_empty() {
                skipped.sort();
                log::warn!("skipped projects: {}", skipped.join(", "));
            }
            if failed.is_empty() {
                Ok(0)
            } else {
                failed.sort();
                log::error!("failed projects: {}", failed.join(", "));
                Ok(1)
            }
        }

        Command::Prepare { distro } => {
            let manager = yap::constants::package_manager_for_distro(&distro)
                .ok_or_else(|| yap::workspace::Error::UnknownDistro(distro.clone()))?;
            yap::pack::dispatch(manager).update()?;
            Ok(0)
        }

        Command::Pull { distro } => {
            let manager = yap::constants::package_manager_for_distro(&distro)
                .ok_or_else(|| yap::workspace::Error::UnknownDistro(distro.clone()))?;
            yap::pack::dispatch(manager).prepare_environment()?;
            Ok(0)
        }

        Command::Zap { distro: _, path } => {
            if path.exists() {
                std::fs::remove_dir_all(&path)?;
                log::info!("removed {}", path.display());
            }
            Ok(0)
        }

        Command::Graph { path } => {
            let root = workspace_root(path);
            let workspace = Workspace::load(&root)?;
            for layer in workspace.graph.layers() {
                let names: Vec<&str> = layer.iter().map(|&n| workspace.graph.nodes[n].as_str()).collect();
                println!("{}", names.join(", "));
            }
            Ok(0)
        }

        Command::Status { path } => {
            let root = workspace_root(path);
            let workspace = Workspace::load(&root)?;
            let build_dir = PathBuf::from(&workspace.manifest.build_dir);
            for layer in workspace.graph.layers() {
                for node in layer {
                    let name = &workspace.graph.nodes[node];
                    let deps: Vec<&str> = workspace.graph.edges[node]
                        .iter()
                        .map(|&dep| workspace.graph.nodes[dep].as_str())
                        .collect();
                    let built = build_dir.join(name).exists();
                    println!(
                        "{name}: depends_on=[{}] build_dir={}",
                        deps.join(", "),
                        if built { "present" } else { "clean" },
                    );
                }
            }
            Ok(0)
        }

        Command::ListDistros => {
            for name in [
                "alpine", "apk", "debian", "ubuntu", "deb", "arch", "archlinux", "pacman", "fedora",
                "rhel", "centos", "rocky", "almalinux", "opensuse", "amazonlinux", "oraclelinux",
            ] {
                println!("{name}");
            }
            Ok(0)
        }

        Command::Version => {
            println!("yap {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}
