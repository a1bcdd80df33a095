//! WebDriver process management and reachability checks

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::WebDriverConfig;
use crate::error::{E2eError, E2eResult};

/// Grace period between SIGTERM and SIGKILL
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// Handle to a spawned WebDriver server (chromedriver, geckodriver)
pub struct DriverHandle {
    child: Option<Child>,
    pub url: String,
}

impl DriverHandle {
    /// Spawn the driver if configured to, then wait until it reports ready.
    ///
    /// With `spawn = false` the handle only checks an already running server.
    pub async fn start(config: &WebDriverConfig) -> E2eResult<Self> {
        let url = config.url.trim_end_matches('/').to_string();

        let child = if config.spawn {
            let port = port_of(&url)?;
            let binary = config.driver_binary();
            info!("Spawning {} on port {}", binary.display(), port);

            let mut command = Command::new(&binary);
            command.arg(format!("--port={}", port));
            let child = spawn_logged(&mut command).map_err(|e| {
                E2eError::DriverStartup(format!("Failed to spawn {}: {}", binary.display(), e))
            })?;
            Some(child)
        } else {
            None
        };

        let handle = DriverHandle { child, url };
        let status_url = format!("{}/status", handle.url);
        poll_until_ok(
            &status_url,
            config.startup_timeout(),
            Duration::from_millis(100),
            Duration::from_secs(2),
        )
        .await
        .map_err(E2eError::DriverHealthCheck)?;

        info!("WebDriver is ready at {}", handle.url);
        Ok(handle)
    }

    /// Terminate the driver this handle spawned; a no-op for attached drivers
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let pid = child.id();
        debug!("Terminating WebDriver pid {}", pid);

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
                let deadline = Instant::now() + TERMINATE_GRACE;
                while Instant::now() < deadline {
                    if let Ok(Some(status)) = child.try_wait() {
                        info!("WebDriver exited ({})", status);
                        return Ok(());
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                warn!("WebDriver pid {} ignored SIGTERM, killing", pid);
            }
        }

        if let Err(e) = child.kill() {
            debug!("kill pid {}: {}", pid, e);
        }
        child.wait()?;
        Ok(())
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop WebDriver: {}", e);
        }
    }
}

/// Spawn with stderr forwarded to the log.
///
/// The pipe is drained on its own thread so a chatty driver never blocks on
/// a full buffer.
fn spawn_logged(command: &mut Command) -> std::io::Result<Child> {
    let mut child = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(stderr) = child.stderr.take() {
        let pid = child.id();
        std::thread::Builder::new()
            .name(format!("driver-stderr-{}", pid))
            .spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    debug!(pid, "{}", line);
                }
            })?;
    }

    Ok(child)
}

/// GET `url` every `interval` until it answers 2xx or `timeout` passes.
///
/// Returns the number of attempts made when it gives up.
async fn poll_until_ok(
    url: &str,
    timeout: Duration,
    interval: Duration,
    request_timeout: Duration,
) -> Result<(), usize> {
    let client = match reqwest::Client::builder().timeout(request_timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Could not build HTTP client for {}: {}", url, e);
            return Err(0);
        }
    };

    let deadline = Instant::now() + timeout;
    let mut attempts = 0;

    while Instant::now() < deadline {
        attempts += 1;
        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            Ok(resp) => warn!("{} answered {}", url, resp.status()),
            // Refused connections are normal while the server boots
            Err(e) if e.is_connect() => debug!("{} not accepting connections yet", url),
            Err(e) => warn!("{} check failed: {}", url, e),
        }
        sleep(interval).await;
    }

    Err(attempts)
}

/// Block until the application under test answers HTTP
pub async fn wait_for_app(base_url: &str, timeout_duration: Duration) -> E2eResult<()> {
    poll_until_ok(
        base_url,
        timeout_duration,
        Duration::from_millis(500),
        Duration::from_secs(5),
    )
    .await
    .map_err(|attempts| E2eError::AppUnreachable {
        url: base_url.to_string(),
        attempts,
    })?;

    info!("Application is up at {}", base_url);
    Ok(())
}

/// Port component of the WebDriver URL
fn port_of(url: &str) -> E2eResult<u16> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| E2eError::Config(format!("invalid WebDriver url {}: {}", url, e)))?;
    parsed
        .port_or_known_default()
        .ok_or_else(|| E2eError::Config(format!("WebDriver url {} has no port", url)))
}
