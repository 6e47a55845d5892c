use std::{
	fs::{self, OpenOptions},
	io::{self, Write},
	path::Path,
	sync::mpsc::{self, Sender},
	thread::{self, JoinHandle},
};

/// One-line activity records for every success and failure. Implementations must
/// never block or fail the caller.
pub trait ActivitySink: Send + Sync {
	fn log(&self, message: &str);
}

/// Appends `"<timestamp> - <message>"` lines to a file from a background writer.
pub struct FileActivityLog {
	sender: Option<Sender<String>>,
	writer: Option<JoinHandle<()>>,
}

impl FileActivityLog {
	pub fn open(path: &Path) -> io::Result<Self> {
		if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
			fs::create_dir_all(dir)?;
		}
		let mut file = OpenOptions::new().create(true).append(true).open(path)?;
		let (sender, receiver) = mpsc::channel::<String>();

		let writer = thread::Builder::new().name("activity-log".into()).spawn(move || {
			for line in receiver {
				if let Err(e) = file.write_all(line.as_bytes()) {
					log::error!("Error writing to log file: {}", e);
				}
			}
			if let Err(e) = file.flush() {
				log::error!("Error flushing log file: {}", e);
			}
		})?;

		Ok(Self { sender: Some(sender), writer: Some(writer) })
	}
}

impl ActivitySink for FileActivityLog {
	fn log(&self, message: &str) {
		log::info!("{}", message);
		let line = format!("{} - {}\n", chrono::Utc::now().to_rfc3339(), message);
		if let Some(sender) = &self.sender {
			if sender.send(line).is_err() {
				log::warn!("Activity log writer is gone, dropping: {}", message);
			}
		}
	}
}

impl Drop for FileActivityLog {
	fn drop(&mut self) {
		// closing the channel ends the writer loop
		self.sender.take();
		if let Some(writer) = self.writer.take() {
			let _ = writer.join();
		}
	}
}
