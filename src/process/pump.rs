//! Blocking pty reader bridged onto the event channel.
//!
//! Pty reads block, so they run on tokio's blocking pool and forward each
//! chunk as a [`JobEvent`] without touching any editor state.

use std::io::Read;

use tracing::{debug, error, trace};

use super::{EventSender, JobEvent, JobId};

/// Pumps raw pty output for one job into the dispatcher's channel.
pub struct PtyPump<R: Read + Send + 'static> {
    job: JobId,
    reader: R,
    tx: EventSender,
    buffer_size: usize,
}

impl<R: Read + Send + 'static> PtyPump<R> {
    /// Create a new PtyPump.
    pub fn new(job: JobId, reader: R, tx: EventSender) -> Self {
        Self {
            job,
            reader,
            tx,
            buffer_size: 4096,
        }
    }

    /// Read until EOF, then run `on_eof` to obtain the exit code.
    ///
    /// Stops early when the channel is closed. The exit event is always the
    /// last event sent for the job.
    pub async fn run<F>(self, on_eof: F)
    where
        F: FnOnce() -> Option<i32> + Send + 'static,
    {
        let PtyPump {
            job,
            mut reader,
            tx,
            buffer_size,
        } = self;

        let result = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; buffer_size];

            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        debug!(%job, "pty reader: EOF");
                        break;
                    }
                    Ok(n) => {
                        trace!(%job, "pty reader: read {} bytes", n);
                        if tx.send(JobEvent::output(job, buf[..n].to_vec())).is_err() {
                            debug!(%job, "pty reader: channel closed");
                            return;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        // Linux reports EIO once the slave side has closed.
                        debug!(%job, "pty reader: stopped: {}", e);
                        break;
                    }
                }
            }

            let code = on_eof();
            let _ = tx.send(JobEvent::exited(job, code));
        })
        .await;

        if let Err(e) = result {
            error!(%job, "pty reader task panicked: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{event_channel, JobEventKind};
    use std::io::Cursor;
    use std::time::Duration;

    #[tokio::test]
    async fn test_pump_forwards_then_exits() {
        let data = b"Hello, World!\nTest line 2\n";
        let (tx, mut rx) = event_channel();
        let job = JobId::from_raw(1);

        let pump = PtyPump::new(job, Cursor::new(data.to_vec()), tx);
        pump.run(|| Some(0)).await;

        let mut received = Vec::new();
        let mut exit = None;
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.job, job);
            match event.kind {
                JobEventKind::Output(bytes) => {
                    assert!(exit.is_none(), "output after exit");
                    received.extend(bytes);
                }
                JobEventKind::Exited(code) => exit = Some(code),
                other => panic!("unexpected event {:?}", other),
            }
        }

        assert_eq!(received, data);
        assert_eq!(exit, Some(Some(0)));
    }

    #[tokio::test]
    async fn test_pump_empty_reader() {
        let (tx, mut rx) = event_channel();
        let job = JobId::from_raw(2);

        PtyPump::new(job, Cursor::new(Vec::new()), tx)
            .run(|| None)
            .await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, JobEventKind::Exited(None));
    }

    #[tokio::test]
    async fn test_pump_channel_closed() {
        let (tx, rx) = event_channel();
        drop(rx);

        let pump = PtyPump::new(JobId::from_raw(3), Cursor::new(b"data".to_vec()), tx);
        let handle = tokio::spawn(pump.run(|| Some(0)));
        let result = tokio::time::timeout(Duration::from_millis(500), handle).await;
        assert!(result.is_ok());
    }
}
