//! Caller-facing wording in each phrase register.
//!
//! Nothing here ever embeds provider output; route failures are described by
//! [`wayfinder_geo::RouteError::user_label`] only.

use wayfinder_core::PhraseRegister;

/// Render a distance as whole meters.
pub fn meters(value: f64) -> String {
    format!("{} m", whole(value))
}

/// Render a duration as whole seconds.
pub fn seconds(value: f64) -> String {
    format!("{} sec", whole(value))
}

fn whole(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// User-facing sentences for one register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Phrasebook {
    register: PhraseRegister,
}

impl Phrasebook {
    pub fn new(register: PhraseRegister) -> Self {
        Self { register }
    }

    pub fn register(&self) -> PhraseRegister {
        self.register
    }

    // ---- voice entry ----

    pub fn entry_prompt(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => {
                "Namaste. Kripya boliye, aap kahaan se kahaan jaana chahte hain."
            }
            PhraseRegister::English => {
                "Hello. Please tell me where you are starting from and where you want to go."
            }
        }
    }

    /// Spoken when the caller stays silent through the entry prompt.
    pub fn entry_closing(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => {
                "Agar aapne bolna band kar diya hai, toh main call ko band kar dunga."
            }
            PhraseRegister::English => "If you have stopped speaking, I will end the call now.",
        }
    }

    // ---- voice clarification ----

    pub fn voice_empty(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => {
                "Mujhe aapki baat samajh nahi aayi. Kripya dobara call karen."
            }
            PhraseRegister::English => "Sorry, I did not understand you. Please call again.",
        }
    }

    pub fn voice_incomplete(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => "Mujhe poori jankari nahi mili. Kripya dobara kahein.",
            PhraseRegister::English => "I did not get both places. Please say it again.",
        }
    }

    pub fn voice_place_not_found(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => "Mujhe jagah ka pata nahi laga. Kripya acche se kahein.",
            PhraseRegister::English => "I could not find that place. Please say it more clearly.",
        }
    }

    /// Spoken when the episode hit an internal fault.
    pub fn voice_fault(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => {
                "Maaf kijiye, abhi kuch gadbad ho gayi. Kripya baad mein call karen."
            }
            PhraseRegister::English => "Sorry, something went wrong. Please call again later.",
        }
    }

    // ---- voice script ----

    pub fn summary(&self, distance_m: f64, duration_s: f64) -> String {
        match self.register {
            PhraseRegister::Hinglish => format!(
                "Rasta mil gaya. Kul doori {} aur samay lagbhag {}.",
                meters(distance_m),
                seconds(duration_s)
            ),
            PhraseRegister::English => format!(
                "Route found. Total distance {}, about {}.",
                meters(distance_m),
                seconds(duration_s)
            ),
        }
    }

    /// One numbered maneuver; `index` is 1-based.
    pub fn step(
        &self,
        index: usize,
        instruction: &str,
        distance_m: f64,
        duration_s: f64,
    ) -> String {
        match self.register {
            PhraseRegister::Hinglish => format!(
                "Kadam {}: {}. Doori {}, samay {}.",
                index,
                instruction,
                meters(distance_m),
                seconds(duration_s)
            ),
            PhraseRegister::English => format!(
                "Step {}: {}. Distance {}, time {}.",
                index,
                instruction,
                meters(distance_m),
                seconds(duration_s)
            ),
        }
    }

    pub fn voice_overflow(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => "Aur details ke liye SMS bheja jayega.",
            PhraseRegister::English => "Full details will be sent by SMS.",
        }
    }

    pub fn route_apology(&self, label: &str) -> String {
        match self.register {
            PhraseRegister::Hinglish => {
                format!("Maaf kijiye. Route prapt karne mein problem: {}.", label)
            }
            PhraseRegister::English => {
                format!("Sorry. There was a problem getting the route: {}.", label)
            }
        }
    }

    // ---- SMS ----

    pub fn sms_empty(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => "Kya aap dobara bhej sakte hain? Samajhne mein dikkat hui.",
            PhraseRegister::English => "Could you send that again? I could not understand it.",
        }
    }

    pub fn sms_format_hint(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => {
                "Kripya format: 'FROM <place> TO <place>' ya 'X se Y tak' bhejein."
            }
            PhraseRegister::English => "Please send: 'FROM <place> TO <place>'.",
        }
    }

    pub fn sms_place_not_found(&self, place: &str) -> String {
        match self.register {
            PhraseRegister::Hinglish => format!(
                "Jagah ka pata nahi laga: {}. Kripya poora naam bhejein.",
                place
            ),
            PhraseRegister::English => {
                format!("Could not find the place: {}. Please send the full name.", place)
            }
        }
    }

    pub fn sms_route_error(&self, label: &str) -> String {
        match self.register {
            PhraseRegister::Hinglish => format!("Route Error: {}.", label),
            PhraseRegister::English => format!("Route error: {}.", label),
        }
    }

    pub fn sms_header(
        &self,
        origin: &str,
        destination: &str,
        distance_m: f64,
        duration_s: f64,
    ) -> String {
        let lead = match self.register {
            PhraseRegister::Hinglish => "Rasta",
            PhraseRegister::English => "Route",
        };
        format!(
            "{}: {} → {}. Distance: {}, Time: {}.",
            lead,
            origin,
            destination,
            meters(distance_m),
            seconds(duration_s)
        )
    }

    pub fn sms_step(&self, index: usize, instruction: &str, distance_m: f64) -> String {
        format!("{}. {} ({})", index, instruction, meters(distance_m))
    }

    pub fn sms_overflow(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => "Aur details ke liye call karein.",
            PhraseRegister::English => "Call for the remaining steps.",
        }
    }

    pub fn sms_fault(&self) -> &'static str {
        match self.register {
            PhraseRegister::Hinglish => {
                "Maaf kijiye, abhi kuch gadbad ho gayi. Kripya baad mein bhejein."
            }
            PhraseRegister::English => "Sorry, something went wrong. Please try again later.",
        }
    }
}
