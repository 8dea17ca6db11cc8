//! Reader session: the one owner of book, playback and progress state
//!
//! All mutation goes through [`ReaderSession`]. The scheduler decides, the
//! session carries out its effects against the timer, the progress store and
//! the presentation sink.

use crate::assembler::{Assembly, BookAssembler, SkippedFragment};
use crate::config::ReaderConfig;
use crate::container::{open_container, validate_display_name, Container};
use crate::error::Result;
use crate::playback::{Effect, PersistReason, PlaybackState, Scheduler, Ticket, Timer};
use crate::sink::{Position, PresentationSink};
use crate::store::ProgressStore;
use crate::types::{BookFingerprint, LoadedBook, Token};
use tracing::{debug, info, warn};

/// What a successful load produced
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub display_name: String,
    pub fingerprint: BookFingerprint,
    pub spine_count: usize,
    pub fragments: usize,
    pub tokens: usize,
    pub skipped: Vec<SkippedFragment>,
    /// Cursor restored from saved progress, if a matching record was found
    pub resumed_at: Option<usize>,
}

/// Controller for one reader
pub struct ReaderSession<T: Timer, S: PresentationSink> {
    config: ReaderConfig,
    assembler: BookAssembler,
    scheduler: Scheduler,
    timer: T,
    sink: S,
    store: ProgressStore,
    book: Option<LoadedBook>,
    fingerprint: Option<BookFingerprint>,
}

impl<T: Timer, S: PresentationSink> ReaderSession<T, S> {
    pub fn new(config: ReaderConfig, timer: T, sink: S, store: ProgressStore) -> Result<Self> {
        let assembler = BookAssembler::new(&config)?;
        let scheduler = Scheduler::new(config.playback.clone());

        Ok(Self {
            config,
            assembler,
            scheduler,
            timer,
            sink,
            store,
            book: None,
            fingerprint: None,
        })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.scheduler.cursor()
    }

    pub fn speed(&self) -> u32 {
        self.scheduler.speed()
    }

    pub fn book(&self) -> Option<&LoadedBook> {
        self.book.as_ref()
    }

    pub fn fingerprint(&self) -> Option<&BookFingerprint> {
        self.fingerprint.as_ref()
    }

    /// Token under the cursor
    pub fn current_token(&self) -> Option<&Token> {
        let cursor = self.scheduler.cursor()?;
        self.book.as_ref()?.token(cursor)
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.scheduler.pending()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Load a book from raw container bytes
    ///
    /// A name without the `.epub` extension is rejected before anything is
    /// reset or parsed. Any other failure leaves the session with no book and
    /// controls disabled.
    pub async fn load_book(
        &mut self,
        bytes: Vec<u8>,
        display_name: &str,
        display_size: u64,
    ) -> Result<LoadSummary> {
        if let Err(err) = validate_display_name(display_name) {
            self.sink.status_changed("Please choose a .epub file.");
            return Err(err);
        }

        self.begin_load(display_name).await;
        let assembly = open_container(display_name, bytes)
            .and_then(|mut container| self.assembler.assemble(container.as_mut()));
        self.finish_load(assembly, display_name, display_size).await
    }

    /// Load a book from an already-open container
    pub async fn load_container(
        &mut self,
        container: &mut dyn Container,
        display_name: &str,
        display_size: u64,
    ) -> Result<LoadSummary> {
        self.begin_load(display_name).await;
        let assembly = self.assembler.assemble(container);
        self.finish_load(assembly, display_name, display_size).await
    }

    pub async fn play(&mut self) {
        let effects = self.scheduler.play();
        self.apply(effects, None).await;
    }

    pub async fn pause(&mut self) {
        let effects = self.scheduler.pause();
        self.apply(effects, None).await;
    }

    pub async fn toggle_play_pause(&mut self) {
        let effects = self.scheduler.toggle();
        self.apply(effects, None).await;
    }

    /// Jump to a global word index
    pub async fn seek(&mut self, index: usize) {
        let effects = self.scheduler.seek(index);
        self.apply(effects, None).await;
    }

    /// Step back `count` words
    pub async fn rewind(&mut self, count: usize) {
        let effects = self.scheduler.rewind(count);
        self.apply(effects, None).await;
    }

    pub async fn restart(&mut self) {
        let effects = self.scheduler.restart();
        self.apply(effects, None).await;
    }

    /// Change speed, returning the effective (clamped, snapped) value
    pub async fn set_speed(&mut self, wpm: u32) -> u32 {
        let effects = self.scheduler.set_speed(wpm);
        let speed = self.scheduler.speed();
        self.apply(effects, None).await;
        self.sink.speed_changed(speed);

        if self.scheduler.is_playing() {
            if let Some(position) = self.current_position() {
                self.sink
                    .position_changed(&position.with_note("speed changed"));
            }
        }
        speed
    }

    /// Jump to the saved position for the loaded book, if there is one
    ///
    /// Playback stops without persisting first, since that would overwrite
    /// the record being resumed.
    pub async fn resume_saved(&mut self) -> bool {
        let Some(fingerprint) = self.fingerprint.clone() else {
            return false;
        };
        let Some(record) = self.store.load().await.filter(|r| r.matches(&fingerprint)) else {
            debug!(%fingerprint, "No saved progress to resume");
            return false;
        };

        let effects = self.scheduler.resume_to(record.global_cursor, record.speed);
        self.sink.speed_changed(self.scheduler.speed());
        self.apply(effects, Some("resumed")).await;
        info!(
            cursor = self.scheduler.cursor().unwrap_or_default(),
            speed = self.scheduler.speed(),
            "Resumed saved progress"
        );
        true
    }

    /// Deliver a fired timer ticket
    pub async fn on_tick(&mut self, ticket: Ticket) {
        let effects = self.scheduler.on_tick(ticket);
        self.apply(effects, None).await;
    }

    /// Stop playback and persist the position
    pub async fn close(&mut self) {
        let effects = self.scheduler.close();
        self.apply(effects, None).await;
    }

    async fn begin_load(&mut self, display_name: &str) {
        let effects = self.scheduler.unload();
        self.apply(effects, None).await;
        self.book = None;
        self.fingerprint = None;
        self.sink.controls_changed(false);
        self.sink.resume_available(false);
        self.sink
            .status_changed(&format!("Loading: {}", display_name));
    }

    async fn finish_load(
        &mut self,
        assembly: Result<Assembly>,
        display_name: &str,
        display_size: u64,
    ) -> Result<LoadSummary> {
        let Assembly { book, skipped } = match assembly {
            Ok(assembly) => assembly,
            Err(err) => {
                warn!(display_name, "Failed to load book: {err}");
                self.sink.status_changed("Failed to load book.");
                self.sink.load_failed(&err);
                return Err(err);
            }
        };

        let fingerprint = BookFingerprint::new(display_name, display_size);
        let saved = self
            .store
            .load()
            .await
            .filter(|record| record.matches(&fingerprint));

        let mut summary = LoadSummary {
            display_name: display_name.to_string(),
            fingerprint: fingerprint.clone(),
            spine_count: book.spine_count(),
            fragments: book.fragments().len(),
            tokens: book.len(),
            skipped,
            resumed_at: None,
        };

        let len = book.len();
        self.book = Some(book);
        self.fingerprint = Some(fingerprint);

        let (cursor, note) = match &saved {
            Some(record) => {
                // Idle here, so this only stores the snapped speed
                self.scheduler.set_speed(record.speed);
                (record.global_cursor, "saved progress found")
            }
            None => (0, "ready"),
        };

        let effects = self.scheduler.load(len, cursor);
        if saved.is_some() {
            summary.resumed_at = self.scheduler.cursor();
        }
        self.sink.speed_changed(self.scheduler.speed());
        self.apply(effects, Some(note)).await;

        self.sink.resume_available(saved.is_some());
        self.sink.controls_changed(true);
        self.sink.status_changed(&format!(
            "Loaded: {} - Tokens: {} (from {} spine items)",
            display_name, summary.tokens, summary.spine_count
        ));

        info!(
            display_name,
            tokens = summary.tokens,
            fragments = summary.fragments,
            skipped = summary.skipped.len(),
            resumed_at = ?summary.resumed_at,
            "Loaded book"
        );
        Ok(summary)
    }

    async fn apply(&mut self, effects: Vec<Effect>, note: Option<&str>) {
        for effect in effects {
            match effect {
                Effect::Schedule { ticket, delay } => self.timer.schedule(ticket, delay),
                Effect::Cancel { ticket } => self.timer.cancel(ticket),
                Effect::Render {
                    cursor,
                    scroll_into_view,
                } => self.render(cursor, scroll_into_view, note),
                Effect::Persist {
                    reason,
                    cursor,
                    speed,
                } => self.persist(reason, cursor, speed).await,
            }
        }
    }

    fn render(&mut self, cursor: usize, scroll_into_view: bool, note: Option<&str>) {
        let note = note.unwrap_or(match self.scheduler.state() {
            PlaybackState::Playing => "playing",
            _ => "paused",
        });
        let Some(position) = self.position_at(cursor) else {
            return;
        };
        let Some(token) = self.book.as_ref().and_then(|book| book.token(cursor)) else {
            return;
        };

        self.sink.word_changed(&token.word);
        self.sink.highlight(cursor, scroll_into_view);
        self.sink.position_changed(&position.with_note(note));
    }

    async fn persist(&mut self, reason: PersistReason, cursor: usize, speed: u32) {
        let Some(fingerprint) = &self.fingerprint else {
            return;
        };

        match self.store.save(fingerprint, cursor, speed).await {
            Ok(_) => {
                debug!(%reason, cursor, speed, "Persisted progress");
                self.sink.resume_available(true);
                if let Some(position) = self.position_at(cursor) {
                    self.sink
                        .position_changed(&position.with_note(reason.as_str()));
                }
            }
            Err(err) => warn!(%reason, "Failed to save progress: {err}"),
        }
    }

    fn current_position(&self) -> Option<Position> {
        self.position_at(self.scheduler.cursor()?)
    }

    fn position_at(&self, cursor: usize) -> Option<Position> {
        let book = self.book.as_ref()?;
        let token = book.token(cursor)?;
        Some(Position::new(
            token.fragment_index,
            token.fragment_ref.clone(),
            cursor,
            book.len(),
        ))
    }
}
