use faqchat_core::{Backend, BackendError, BackendVariant, Config, SessionState, SessionStore};

pub struct App {
    // Core state
    pub should_quit: bool,
    pub session: SessionState,
    pub backend: Backend,
    pub store: SessionStore,
    pub backend_variant: BackendVariant,

    // Input state
    pub cursor: usize, // cursor position in session.input, in chars

    // Chat display state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // In-flight request
    pub task: Option<tokio::task::JoinHandle<Result<String, BackendError>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: &Config, store: SessionStore) -> anyhow::Result<Self> {
        let transcript = store.load()?;
        let backend = Backend::from_config(config);

        Ok(Self {
            should_quit: false,
            session: SessionState::with_transcript(transcript),
            backend,
            store,
            backend_variant: config.backend,

            cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            task: None,

            animation_frame: 0,
        })
    }

    pub fn loading(&self) -> bool {
        self.session.in_flight()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(self.chat_height / 2);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height / 2);
    }

    /// Scroll chat to bottom so the latest turn (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for block in self.session.transcript.display_blocks() {
            // Calculate wrapped lines for each line of the block
            for line in block.lines() {
                total_lines += wrapped_lines(line, wrap_width);
            }
            total_lines += 1; // Blank line after block
        }

        if self.loading() {
            total_lines += 1; // "Thinking..." indicator
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}

/// Rows one logical line occupies when wrapped to `wrap_width`.
/// Uses character count, not byte length, for proper UTF-8 handling.
fn wrapped_lines(line: &str, wrap_width: usize) -> u16 {
    let char_count = line.chars().count();
    if char_count == 0 {
        1 // Empty line still takes one line
    } else {
        char_count.div_ceil(wrap_width) as u16
    }
}
