use dioxus::prelude::*;

use ui::{use_auth, ActivityLog, ActivityLogPanel, AuthProvider, ConfigProvider, Navbar};
use views::{Allergies, Appointments, Home, Login, Logs, Profile, Records};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(AppLayout)]
        #[route("/")]
        Home {},
        #[route("/login")]
        Login {},
        #[route("/appointments")]
        Appointments {},
        #[route("/records")]
        Records {},
        #[route("/allergies")]
        Allergies {},
        #[route("/logs")]
        Logs {},
        #[route("/profile")]
        Profile {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        use tracing_subscriber::EnvFilter;

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!("Failed to start runtime: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = runtime.block_on(launch_server()) {
            tracing::error!("Server stopped: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
async fn launch_server() -> Result<(), Box<dyn std::error::Error>> {
    use axum::routing::get;
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use tower_sessions::cookie::time::Duration;
    use tower_sessions::cookie::SameSite;
    use tower_sessions::{Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;

    dotenvy::dotenv().ok();

    let pool = api::db::get_pool().await?;

    sqlx::migrate!("../api/migrations").run(pool).await?;
    tracing::info!("Database migrations applied");

    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)));

    let router = axum::Router::new()
        .route("/auth/google/callback", get(google_callback))
        .serve_dioxus_application(ServeConfig::new(), App)
        .layer(session_layer);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}

#[cfg(feature = "server")]
async fn google_callback(
    axum::extract::Query(params): axum::extract::Query<std::collections::HashMap<String, String>>,
    session: tower_sessions::Session,
) -> axum::response::Redirect {
    use axum::response::Redirect;

    let Some(code) = params.get("code") else {
        tracing::error!("Google callback missing code");
        return Redirect::to("/login?error=missing_code");
    };
    let Some(state) = params.get("state") else {
        tracing::error!("Google callback missing state");
        return Redirect::to("/login?error=missing_state");
    };

    let finished = match api::auth::GoogleSignIn::new() {
        Ok(google) => google.finish(code, state).await,
        Err(e) => Err(e),
    };
    let user = match finished {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Google sign-in failed: {}", e);
            return Redirect::to(&format!("/login?error={}", e.code()));
        }
    };

    // New session id on sign-in so a pre-login cookie cannot be reused.
    if let Err(e) = session.cycle_id().await {
        tracing::error!("Failed to cycle session id: {}", e);
        return Redirect::to("/login?error=session_error");
    }
    if let Err(e) = session
        .insert(api::auth::SESSION_USER_ID_KEY, &user.id)
        .await
    {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/login?error=session_error");
    }
    if let Err(e) = session.save().await {
        tracing::error!("Failed to save session: {}", e);
        return Redirect::to("/login?error=session_save_error");
    }

    tracing::info!(user_id = %user.id, "signed in with Google");
    Redirect::to("/appointments")
}

#[component]
fn App() -> Element {
    use_context_provider(|| Signal::new(ActivityLog::default()));

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        ConfigProvider {
            AuthProvider {
                Router::<Route> {}
            }
        }
    }
}

/// Navbar over every page. Entity links appear once signed in.
#[component]
fn AppLayout() -> Element {
    let session = use_auth();
    let signed_in = session().is_signed_in();

    rsx! {
        Navbar {
            Link { to: Route::Home {}, "Home" }
            if signed_in {
                Link { to: Route::Appointments {}, "Appointments" }
                Link { to: Route::Records {}, "Records" }
                Link { to: Route::Allergies {}, "Allergies" }
                Link { to: Route::Logs {}, "Logs" }
                Link { to: Route::Profile {}, "Profile" }
            } else {
                Link { to: Route::Login {}, "Sign in" }
            }
        }
        main {
            Outlet::<Route> {}
        }
        ActivityLogPanel {}
    }
}
