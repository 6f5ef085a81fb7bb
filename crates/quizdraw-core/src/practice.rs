//! Offline drawing practice: a fixed word list and a local canvas, no server.

use crate::canvas::{CanvasError, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DrawingCanvas};
use crate::model::{Difficulty, DrawingWord};

const PRACTICE_WORDS: [(&str, &str, Difficulty); 8] = [
    ("Mitochondria", "Cell Biology", Difficulty::Easy),
    ("DNA Double Helix", "Genetics", Difficulty::Easy),
    ("Neuron", "Nervous System", Difficulty::Medium),
    ("Nephron", "Excretory System", Difficulty::Hard),
    ("Heart Chambers", "Circulatory System", Difficulty::Medium),
    ("Respiratory System", "Anatomy", Difficulty::Hard),
    ("Cell Membrane", "Cell Biology", Difficulty::Easy),
    ("Chromosome", "Genetics", Difficulty::Medium),
];

/// The built-in practice word list.
pub fn practice_words() -> Vec<DrawingWord> {
    PRACTICE_WORDS
        .iter()
        .enumerate()
        .map(|(i, (word, category, difficulty))| DrawingWord {
            id: (i + 1).to_string(),
            word: word.to_string(),
            category: category.to_string(),
            difficulty: *difficulty,
        })
        .collect()
}

/// Solo drawing against the practice word list.
#[derive(Debug)]
pub struct PracticeSession {
    words: Vec<DrawingWord>,
    index: usize,
    show_word: bool,
    canvas: DrawingCanvas,
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

impl PracticeSession {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            words: practice_words(),
            index: 0,
            show_word: true,
            canvas: DrawingCanvas::new(width, height, true),
        }
    }

    pub fn current_word(&self) -> &DrawingWord {
        &self.words[self.index]
    }

    /// Zero-based position in the word list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance to the next word (wrapping) and wipe the canvas.
    pub fn next_word(&mut self) -> Result<&DrawingWord, CanvasError> {
        self.index = (self.index + 1) % self.words.len();
        self.canvas.clear()?;
        log::debug!("Practice word {}/{}", self.index + 1, self.words.len());
        Ok(&self.words[self.index])
    }

    pub fn reset_canvas(&mut self) -> Result<(), CanvasError> {
        self.canvas.clear().map(|_| ())
    }

    pub fn is_word_visible(&self) -> bool {
        self.show_word
    }

    pub fn toggle_word_visibility(&mut self) -> bool {
        self.show_word = !self.show_word;
        self.show_word
    }

    pub fn canvas(&self) -> &DrawingCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut DrawingCanvas {
        &mut self.canvas
    }
}
