//! Dialogue practice scripts
//!
//! A scripted conversation alternates AI lines with lines the learner must
//! sign. A cursor walks the script; each user line names the lesson whose
//! gesture answers it.

use serde::{Deserialize, Serialize};
use signa_core::{LessonId, SignaResult};

use crate::EngineHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    #[serde(rename = "AI")]
    Ai,
    User,
}

/// One line of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: Speaker,
    pub text: String,
    #[serde(default)]
    pub target_lesson_id: Option<u32>,
}

impl DialogueLine {
    /// Lesson to sign, for user lines that carry one
    pub fn target_lesson(&self) -> Option<LessonId> {
        match self.speaker {
            Speaker::User => self.target_lesson_id.map(LessonId::new),
            Speaker::Ai => None,
        }
    }
}

/// A situation and its scripted conversation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogueScript {
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub dialogue: Vec<DialogueLine>,
}

impl DialogueScript {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Lessons practiced by the script, in order of appearance
    pub fn lessons(&self) -> Vec<LessonId> {
        self.dialogue.iter().filter_map(|l| l.target_lesson()).collect()
    }
}

/// Result of advancing a cursor
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueStep {
    /// Moved to the next line
    Next(DialogueLine),
    /// The script has ended
    Complete,
}

/// Position in a script
#[derive(Debug, Clone)]
pub struct DialogueCursor {
    script: DialogueScript,
    index: usize,
    completed: bool,
}

impl DialogueCursor {
    pub fn new(script: DialogueScript) -> Self {
        let completed = script.dialogue.is_empty();
        Self {
            script,
            index: 0,
            completed,
        }
    }

    pub fn script(&self) -> &DialogueScript {
        &self.script
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&DialogueLine> {
        if self.completed {
            return None;
        }
        self.script.dialogue.get(self.index)
    }

    /// The current line is the learner's turn
    pub fn awaiting_user(&self) -> bool {
        self.current().map(|l| l.speaker == Speaker::User).unwrap_or(false)
    }

    /// Lesson the learner must sign now
    pub fn target_lesson(&self) -> Option<LessonId> {
        self.current().and_then(DialogueLine::target_lesson)
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Move to the next line (after success, skip, or an AI line)
    pub fn advance(&mut self) -> DialogueStep {
        if self.completed {
            return DialogueStep::Complete;
        }
        let next = self.index + 1;
        match self.script.dialogue.get(next) {
            Some(line) => {
                self.index = next;
                DialogueStep::Next(line.clone())
            }
            None => {
                self.completed = true;
                DialogueStep::Complete
            }
        }
    }

    /// Advance and point the engine at the next user line's lesson.
    ///
    /// The engine is paused on every step; the caller restarts checking
    /// once the learner is ready.
    pub fn advance_engine(&mut self, engine: &EngineHandle) -> SignaResult<DialogueStep> {
        let step = self.advance();
        engine.pause()?;
        if let Some(lesson) = self.target_lesson() {
            engine.set_lesson(lesson.to_string())?;
        }
        Ok(step)
    }
}
