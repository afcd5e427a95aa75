use clap::{Arg, Command};

pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_ANON_KEY: &str = "anon-key";
pub const ARG_BACKEND_TIMEOUT: &str = "backend-timeout-seconds";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Auth provider base URL, example: https://project.example.co/auth/v1")
                .env("PRAXIS_GUARD_AUTH_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ANON_KEY)
                .long(ARG_ANON_KEY)
                .help("Public (anon) API key sent to the auth provider")
                .env("PRAXIS_GUARD_ANON_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_BACKEND_TIMEOUT)
                .long(ARG_BACKEND_TIMEOUT)
                .help("Timeout in seconds for each auth provider request")
                .env("PRAXIS_GUARD_BACKEND_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL; its origin is the only one allowed by CORS")
                .env("PRAXIS_GUARD_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
}
