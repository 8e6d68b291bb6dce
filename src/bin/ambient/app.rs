//! Keyboard-driven front end for the mixer.

use std::{
    io::{self, Write},
    time::Duration,
};

use ambient_dsp::{Mixer, MixerConfig, SoundCategory};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    queue,
    style::Print,
    terminal::{self, ClearType},
};

/// Volume change per Up/Down press.
const VOLUME_STEP: f32 = 0.05;

pub struct App {
    mixer: Mixer,
    selected: usize,
    should_quit: bool,
}

impl App {
    pub fn new(config: MixerConfig) -> Self {
        Self {
            mixer: Mixer::new(config),
            selected: 0,
            should_quit: false,
        }
    }

    /// Start `initial`, then take over the terminal until the user quits.
    pub fn run(mut self, initial: &[SoundCategory]) -> EyreResult<()> {
        for &category in initial {
            self.mixer.toggle(category);
        }
        if let Some(&first) = initial.first() {
            self.selected = first.index();
        }

        println!("ambient: 1-5 toggle, Up/Down volume, Tab select, q quit");
        terminal::enable_raw_mode().wrap_err("failed to enable raw mode")?;
        let result = self.event_loop();
        terminal::disable_raw_mode().wrap_err("failed to restore terminal")?;
        println!();

        let available = self.mixer.is_available();
        self.mixer.close();

        result?;
        if !available {
            return Err(eyre!("no usable audio output"));
        }
        Ok(())
    }

    fn event_loop(&mut self) -> EyreResult<()> {
        let mut stdout = io::stdout();

        while !self.should_quit {
            self.mixer.poll();
            self.draw(&mut stdout)?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let count = SoundCategory::ALL.len();
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='5') => {
                self.selected = c as usize - '1' as usize;
                self.mixer.toggle(SoundCategory::ALL[self.selected]);
            }
            KeyCode::Tab => self.selected = (self.selected + 1) % count,
            KeyCode::BackTab => self.selected = (self.selected + count - 1) % count,
            KeyCode::Up => self.nudge(VOLUME_STEP),
            KeyCode::Down => self.nudge(-VOLUME_STEP),
            _ => {}
        }
    }

    fn nudge(&mut self, delta: f32) {
        let category = SoundCategory::ALL[self.selected];
        if let Some(volume) = self.mixer.state().volume(category) {
            let next = ((volume + delta) * 100.0).round() / 100.0;
            self.mixer.set_volume(category, next);
        }
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine)
        )?;

        if !self.mixer.is_available() {
            queue!(out, Print("audio output unavailable (q to quit)"))?;
            return out.flush();
        }

        for (i, category) in SoundCategory::ALL.into_iter().enumerate() {
            let marker = if i == self.selected { '>' } else { ' ' };
            let level = match self.mixer.state().volume(category) {
                Some(volume) => format!("{:>3.0}%", volume * 100.0),
                None => " off".to_string(),
            };
            let cell = format!("{marker}{} {:<7} {level}  ", i + 1, category.as_str());
            queue!(out, Print(cell))?;
        }
        out.flush()
    }
}
