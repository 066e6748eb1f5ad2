#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["ssr-dev", "serve"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert!(args.config.is_none());
                assert!(args.port.is_none());
                assert!(args.host.is_none());
            }
            other => panic!("expected serve, got {:?}", other),
        }
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "ssr-dev",
            "serve",
            "--config",
            "dev.json",
            "--port",
            "3000",
            "--host",
            "0.0.0.0",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.config, Some(PathBuf::from("dev.json")));
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Cli::try_parse_from(["ssr-dev", "serve", "--port", "0"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ssr-dev", "check", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ssr-dev", "-v", "-q", "check"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["ssr-dev"]).is_err());
    }
}
