use clap::Parser;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[clap(
    name = "quire",
    about = "GraphQL queries over a users and posts dataset",
    version
)]
pub struct Opt {
    #[clap(
        long,
        default_value = "8000",
        value_name = "PORT",
        env = "QUIRE_HTTP_PORT",
        help = "Port for the GraphQL HTTP server"
    )]
    pub http_port: u16,
    #[clap(
        long,
        default_value = "schema/schema.graphql",
        value_name = "FILE",
        env = "QUIRE_SCHEMA",
        help = "Path of the GraphQL schema (SDL) to serve"
    )]
    pub schema: PathBuf,
    #[clap(
        long,
        value_name = "FILE",
        env = "QUIRE_DATASET",
        help = "JSON file with the users and posts to serve; the built-in \
                sample dataset is used when this is not set"
    )]
    pub dataset: Option<PathBuf>,
    #[clap(long, help = "Enable debug logging")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opt = Opt::try_parse_from(["quire"]).unwrap();
        assert_eq!(opt.http_port, 8000);
        assert_eq!(opt.schema, PathBuf::from("schema/schema.graphql"));
        assert_eq!(opt.dataset, None);
        assert!(!opt.debug);
    }

    #[test]
    fn flags() {
        let opt = Opt::try_parse_from([
            "quire",
            "--http-port",
            "9000",
            "--schema",
            "/etc/quire/blog.graphql",
            "--dataset",
            "/var/lib/quire/blog.json",
            "--debug",
        ])
        .unwrap();
        assert_eq!(opt.http_port, 9000);
        assert_eq!(opt.schema, PathBuf::from("/etc/quire/blog.graphql"));
        assert_eq!(opt.dataset, Some(PathBuf::from("/var/lib/quire/blog.json")));
        assert!(opt.debug);
    }

    #[test]
    fn rejects_bad_ports() {
        assert!(Opt::try_parse_from(["quire", "--http-port", "http"]).is_err());
    }
}
