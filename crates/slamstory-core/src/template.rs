//! The six storyboard beats and the two text-feature prompts.

use serde::Serialize;

use crate::opponent::Opponent;

/// One story beat: what the panel is called, what it says, and how to draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    pub title: String,
    pub caption: String,
    pub prompt: String,
}

impl PromptTemplate {
    fn new(title: &str, caption: &str, prompt: String) -> Self {
        Self {
            title: title.to_string(),
            caption: caption.to_string(),
            prompt,
        }
    }

    /// Stable slot identifier: `panel-` plus the title with whitespace runs collapsed to `-`.
    pub fn slot_id(&self) -> String {
        slot_id(&self.title)
    }
}

pub fn slot_id(title: &str) -> String {
    format!("panel-{}", title.split_whitespace().collect::<Vec<_>>().join("-"))
}

/// Build the six panel templates for a final against `opponent`, in story order.
pub fn storyboard_prompts(opponent: Opponent) -> Vec<PromptTemplate> {
    let name = opponent.name();
    vec![
        PromptTemplate::new(
            "The Walkout",
            "The world is watching as you step onto the grandest stage in tennis.",
            format!(
                "A tennis player with the likeness of the person in the image, walks onto the blue hard court of Arthur Ashe Stadium at night for the US Open final. The stadium is packed, with flashbulbs going off. {name} is visible walking alongside. The player has intense focus. Cinematic, hyper-realistic, 8K, dramatic wide shot."
            ),
        ),
        PromptTemplate::new(
            "The Opening Serve",
            "You unleash the first serve, setting the tone for the battle ahead.",
            "Action shot, low angle. The tennis player with the likeness of the person in the image is at the peak of their service motion, tossing the ball under stadium lights. Muscles are tensed, face shows determination. Dynamic, motion blur, photo-realistic.".to_string(),
        ),
        PromptTemplate::new(
            "The Grueling Rally",
            "A punishing baseline exchange. Every point is a war of attrition.",
            format!(
                "Tense rally, shot from behind the baseline. {name} hits a powerful backhand. The player with the likeness of the person in the image is in the foreground, lunging for a forehand, grit on their face. US Open logo visible on the net. High shutter speed photography style."
            ),
        ),
        PromptTemplate::new(
            "Match Point",
            "The entire match comes down to this single point.",
            "Match Point. Close-up on the face of the tennis player with the likeness of the person in the image. Sweat is beading on their forehead, eyes are locked on the ball, a mix of exhaustion and fierce determination. The roar of the crowd is palpable. Shallow depth of field, emotional.".to_string(),
        ),
        PromptTemplate::new(
            "VICTORY!",
            "A dream realized. You are the US Open Champion.",
            format!(
                "VICTORY! The tennis player with the likeness of the person in the image has just won. They drop to their knees on the court, arms raised to the sky in triumph. Confetti begins to fall. In the background, a respectful but disappointed {name} approaches the net. Emotional, epic, cinematic."
            ),
        ),
        PromptTemplate::new(
            "The Champion",
            "Lifting the trophy, a moment etched in history.",
            "The tennis player with the likeness of the person in the image is triumphant, lifting the US Open trophy with both hands as confetti rains down. A huge smile of joy and relief is on their face. Photographers' flashes illuminate the scene. Close-up, celebratory, iconic sports photograph.".to_string(),
        ),
    ]
}

pub fn commentary_prompt(opponent: Opponent) -> String {
    format!(
        "You are an elite tennis commentator. Write a short, dramatic, and exciting summary for a highlights reel of the US Open final where a new champion defeated {}. The key moments were: the intense walkout, a powerful opening serve, a grueling baseline rally, a tense match point, and the final victory celebration with the trophy. Keep it to one paragraph.",
        opponent.name()
    )
}

pub fn interview_prompt(opponent: Opponent) -> String {
    format!(
        "You are a sports journalist. You are interviewing a tennis player who just won their first US Open title by defeating {}. Ask them three insightful and celebratory questions for their post-match interview.",
        opponent.name()
    )
}
