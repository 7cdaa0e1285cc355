// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dedicated writer threads, one per stream.
//!
//! Formatted records are handed to the stream's thread as whole lines, so
//! concurrent logging calls never interleave partial records. The facility
//! holds one [`WorkerGuard`] per stream; dropping the guard queues a shutdown
//! behind any records still in flight and waits for the thread to
//! acknowledge its final flush.

use std::io::Write;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::TryRecvError;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;

// How long a dropped guard waits for its thread to finish writing.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Message {
    Line(Vec<u8>),
    Shutdown,
}

/// A handle that sends formatted records to a stream's writer thread.
#[derive(Debug)]
pub struct NonBlocking {
    sender: Sender<Message>,
}

impl NonBlocking {
    /// Spawns a writer thread draining into `writer` and returns the sending
    /// handle plus the guard that flushes the thread on drop.
    pub fn spawn<T: Write + Send + 'static>(
        thread_name: impl Into<String>,
        writer: T,
    ) -> (NonBlocking, WorkerGuard) {
        let (sender, receiver) = unbounded();
        let (done_sender, done_receiver) = bounded(1);

        let handle = thread::Builder::new()
            .name(thread_name.into())
            .spawn(move || drain(writer, receiver, done_sender))
            .expect("failed to spawn a stream writer thread");

        let guard = WorkerGuard {
            _handle: handle,
            sender: sender.clone(),
            done: done_receiver,
        };
        (NonBlocking { sender }, guard)
    }

    /// Sends one formatted record to the writer thread.
    pub fn send(&self, line: Vec<u8>) -> anyhow::Result<()> {
        self.sender
            .send(Message::Line(line))
            .context("failed to send record to the writer thread")
    }
}

/// Flushes a stream's writer thread when dropped.
///
/// Records sent through [`NonBlocking`] are written at some later point by
/// the thread, so a process that exits abruptly can lose buffered lines.
/// The facility holds one guard per stream and releases them when it is
/// dropped, which waits (bounded by a timeout) until everything queued so
/// far has been written and flushed.
#[derive(Debug)]
pub struct WorkerGuard {
    _handle: JoinHandle<()>,
    sender: Sender<Message>,
    done: Receiver<()>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        // The shutdown message queues behind any records still in flight.
        if self.sender.send(Message::Shutdown).is_ok()
            && self.done.recv_timeout(SHUTDOWN_TIMEOUT).is_err()
        {
            eprintln!("timed out waiting for a stream writer thread to flush");
        }
    }
}

// The writer thread: block for a line, drain whatever else has queued up,
// then flush before blocking again. Write failures are reported to stderr;
// a log line must never take the process down.
fn drain<T: Write>(mut writer: T, receiver: Receiver<Message>, done: Sender<()>) {
    loop {
        match receiver.recv() {
            Ok(Message::Line(line)) => {
                write_line(&mut writer, &line);
                loop {
                    match receiver.try_recv() {
                        Ok(Message::Line(line)) => write_line(&mut writer, &line),
                        Ok(Message::Shutdown) => return finish(writer, done),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return finish(writer, done),
                    }
                }
                flush(&mut writer);
            }
            Ok(Message::Shutdown) => return finish(writer, done),
            Err(_) => return finish(writer, done),
        }
    }
}

fn write_line<T: Write>(writer: &mut T, line: &[u8]) {
    if let Err(err) = writer.write_all(line) {
        eprintln!("failed to write log record: {err}");
    }
}

fn flush<T: Write>(writer: &mut T) {
    if let Err(err) = writer.flush() {
        eprintln!("failed to flush log records: {err}");
    }
}

// Final flush, then acknowledge so a waiting guard can return.
fn finish<T: Write>(mut writer: T, done: Sender<()>) {
    flush(&mut writer);
    let _ = done.send(());
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_guard_drop_flushes_pending_lines() {
        let buffer = SharedBuffer::default();
        let (writer, guard) = NonBlocking::spawn("test-writer", buffer.clone());

        for i in 0..100 {
            writer.send(format!("line {i}\n").into_bytes()).unwrap();
        }
        drop(guard);

        let written = buffer.0.lock().unwrap();
        let text = String::from_utf8(written.clone()).unwrap();
        assert_eq!(text.lines().count(), 100);
        assert!(text.ends_with("line 99\n"));
    }

    #[test]
    fn test_lines_arrive_whole_and_in_order() {
        let buffer = SharedBuffer::default();
        let (writer, guard) = NonBlocking::spawn("test-writer", buffer.clone());

        writer.send(b"first\n".to_vec()).unwrap();
        writer.send(b"second\n".to_vec()).unwrap();
        drop(writer);
        drop(guard);

        let written = buffer.0.lock().unwrap();
        assert_eq!(String::from_utf8(written.clone()).unwrap(), "first\nsecond\n");
    }
}
