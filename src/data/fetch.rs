use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use thiserror::Error;

use super::loader::{DatasetKind, LoadError, parse_text};
use super::model::Dataset;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(Box<ureq::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] LoadError),

    #[error("fetch worker exited without a result")]
    Disconnected,
}

impl From<ureq::Error> for FetchError {
    fn from(e: ureq::Error) -> Self {
        FetchError::Http(Box::new(e))
    }
}

/// GET the whole body of `url` and parse it with the dataset's schema.
/// No retry, no streaming.
pub fn fetch_dataset(url: &str, kind: DatasetKind) -> Result<Dataset, FetchError> {
    let body = ureq::get(url).call()?.into_string()?;
    Ok(parse_text(&body, &kind.schema())?)
}

// ---------------------------------------------------------------------------
// Background fetch
// ---------------------------------------------------------------------------

/// A one-shot fetch running on a worker thread.
///
/// The UI thread calls [`PendingFetch::poll`] once per frame; `notify` runs
/// on the worker right after the result is sent so the UI can repaint.
pub struct PendingFetch {
    pub kind: DatasetKind,
    pub url: String,
    rx: Receiver<Result<Dataset, FetchError>>,
}

impl PendingFetch {
    pub fn spawn<F>(url: &str, kind: DatasetKind, notify: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker_url = url.to_string();
        thread::spawn(move || {
            let result = fetch_dataset(&worker_url, kind);
            // The receiver is gone if the app closed meanwhile.
            let _ = tx.send(result);
            notify();
        });
        log::info!("Fetching {} dataset from {url}", kind.label());
        PendingFetch {
            kind,
            url: url.to_string(),
            rx,
        }
    }

    /// `None` while the worker is still running.
    pub fn poll(&self) -> Option<Result<Dataset, FetchError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FetchError::Disconnected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::{Duration, Instant};

    /// Serve exactly one HTTP response on an ephemeral port.
    fn serve_once(status: &str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let status = status.to_string();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/data")
    }

    fn wait(pending: &PendingFetch) -> Result<Dataset, FetchError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "fetch timed out");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn fetches_and_parses_in_background() {
        let url = serve_once(
            "200 OK",
            "M,0.5,0.3,0.1,0.4,0.2,0.1,0.15,9\nF,0.4,0.3,0.1,0.4,0.2,0.1,0.15,8\n",
        );
        let pending = PendingFetch::spawn(&url, DatasetKind::Abalone, || {});
        let ds = wait(&pending).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].category, "F");
    }

    #[test]
    fn http_error_status_is_reported() {
        let url = serve_once("404 Not Found", "missing");
        let err = fetch_dataset(&url, DatasetKind::Iris).unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }
}
