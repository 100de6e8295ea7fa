use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds all parameters required to initialize and run the server:
/// database connection, server host and port, worker count, CORS settings,
/// logging preferences and the credentials for both external collaborators
/// (the Razorpay payment gateway and the Clerk identity provider).
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Razorpay payment gateway credentials.
    pub razorpay: RazorpayConfig,
    /// Clerk identity provider credentials.
    pub clerk: ClerkConfig,
}

#[derive(Clone, Debug)]
/// Credentials for the Razorpay payment gateway.
pub struct RazorpayConfig {
    /// Public key id, returned to the client so it can open the checkout widget.
    pub key_id: String,
    /// Shared secret used for order creation and payment signature checks.
    pub key_secret: String,
    /// Base URL of the Razorpay REST API.
    pub api_url: String,
}

#[derive(Clone, Debug)]
/// Credentials for the Clerk identity provider.
pub struct ClerkConfig {
    /// Backend API secret key.
    pub secret_key: String,
    /// Signing secret for inbound webhook envelopes (`whsec_...`).
    pub webhook_signing_secret: String,
    /// PEM-encoded RSA public key of the Clerk instance, used to validate
    /// session JWTs locally.
    pub jwt_public_key: String,
    /// Base URL of the Clerk backend API.
    pub api_url: String,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Required:
    /// - `ENVIRONMENT`: "development" or "production"
    /// - `DATABASE_URL`: Connection string for the database
    ///
    /// Optional (with defaults):
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET`: gateway credentials
    /// - `RAZORPAY_API_URL`: gateway base URL (default: the public API)
    /// - `CLERK_SECRET_KEY` / `CLERK_WEBHOOK_SIGNING_SECRET` / `CLERK_JWT_PUBLIC_KEY`
    /// - `CLERK_API_URL`: identity provider base URL (default: the public API)
    ///
    /// # Panics
    ///
    /// Panics if required environment variables are missing or if numeric
    /// values cannot be parsed.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            razorpay: RazorpayConfig {
                key_id: env::var("RAZORPAY_KEY_ID").unwrap_or_default(),
                key_secret: env::var("RAZORPAY_KEY_SECRET").unwrap_or_default(),
                api_url: env::var("RAZORPAY_API_URL")
                    .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string()),
            },
            clerk: ClerkConfig {
                secret_key: env::var("CLERK_SECRET_KEY").unwrap_or_default(),
                webhook_signing_secret: env::var("CLERK_WEBHOOK_SIGNING_SECRET")
                    .unwrap_or_default(),
                // PEM keys are often stored with escaped newlines
                jwt_public_key: env::var("CLERK_JWT_PUBLIC_KEY")
                    .unwrap_or_default()
                    .replace("\\n", "\n"),
                api_url: env::var("CLERK_API_URL")
                    .unwrap_or_else(|_| "https://api.clerk.com/v1".to_string()),
            },
        })
    }
}
