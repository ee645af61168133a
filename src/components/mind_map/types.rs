/// Modifier keys held during a pointer, wheel or key event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	pub alt: bool,
	pub ctrl: bool,
	pub meta: bool,
	pub shift: bool,
}

impl Modifiers {
	/// Ctrl on most platforms, Cmd on macOS.
	pub fn command(&self) -> bool {
		self.ctrl || self.meta
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
	Info,
	Warning,
	Error,
}

/// A message for the user. Info and warnings dismiss themselves; errors wait to be dismissed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
	pub level: NoticeLevel,
	pub message: String,
}

impl Notice {
	pub fn info(message: impl Into<String>) -> Self {
		Self {
			level: NoticeLevel::Info,
			message: message.into(),
		}
	}

	pub fn warning(message: impl Into<String>) -> Self {
		Self {
			level: NoticeLevel::Warning,
			message: message.into(),
		}
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self {
			level: NoticeLevel::Error,
			message: message.into(),
		}
	}

	pub fn is_transient(&self) -> bool {
		self.level != NoticeLevel::Error
	}
}
