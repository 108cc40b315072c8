use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::completion::{DEFAULT_API_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::validate::DEFAULT_MAX_CODE_LENGTH;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "code-review-gateway")]
#[command(about = "Rate-limited gateway submitting code to an LLM for review")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Deployment policy preset
    #[arg(long, value_enum, default_value_t = Profile::Local)]
    pub profile: Profile,

    // Overrides for the preset
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub human_quota: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub bot_quota: Option<u32>,

    // Rate limit window in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub window_secs: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_MAX_CODE_LENGTH)]
    pub max_code_length: usize,

    // Completion provider
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    // Env var holding the API key, read on every request
    #[arg(long, default_value = "OPENAI_API_KEY")]
    pub api_key_env: String,
}

impl Args {
    pub fn policy(&self) -> Policy {
        let mut policy = self.profile.policy();
        if let Some(quota) = self.human_quota {
            policy.human_quota = quota;
        }
        if let Some(quota) = self.bot_quota {
            policy.bot_quota = BotQuota::Fixed(quota);
        }
        if let Some(secs) = self.window_secs {
            policy.window = Duration::from_secs(secs);
        }
        policy.max_code_length = self.max_code_length;
        policy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    // Short-lived function invocations, hourly window
    Serverless,
    // Long-running server, daily window
    Local,
}

impl Profile {
    pub fn policy(self) -> Policy {
        match self {
            Profile::Serverless => Policy::serverless(),
            Profile::Local => Policy::local(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotQuota {
    Fixed(u32),
    // Half the human quota, at least one
    Halved,
}

// Builds the 429 message from the classification and the policy in force
pub type MessageFormatter = fn(is_bot: bool, policy: &Policy) -> String;

#[derive(Debug, Clone)]
pub struct Policy {
    pub human_quota: u32,
    pub bot_quota: BotQuota,
    pub window: Duration,
    pub max_code_length: usize,
    pub message: MessageFormatter,
}

impl Policy {
    pub fn serverless() -> Self {
        Self {
            human_quota: 5,
            bot_quota: BotQuota::Halved,
            window: Duration::from_secs(60 * 60),
            max_code_length: DEFAULT_MAX_CODE_LENGTH,
            message: serverless_message,
        }
    }

    pub fn local() -> Self {
        Self {
            human_quota: 10,
            bot_quota: BotQuota::Fixed(2),
            window: Duration::from_secs(24 * 60 * 60),
            max_code_length: DEFAULT_MAX_CODE_LENGTH,
            message: local_message,
        }
    }

    // Never more than the human quota
    pub fn effective_quota(&self, is_bot: bool) -> u32 {
        if !is_bot {
            return self.human_quota;
        }
        let bot = match self.bot_quota {
            BotQuota::Fixed(quota) => quota,
            BotQuota::Halved => (self.human_quota / 2).max(1),
        };
        bot.min(self.human_quota)
    }

    pub fn rate_limit_message(&self, is_bot: bool) -> String {
        (self.message)(is_bot, self)
    }
}

fn serverless_message(is_bot: bool, policy: &Policy) -> String {
    let quota = policy.effective_quota(is_bot);
    let window = describe_window(policy.window);
    if is_bot {
        format!("Automated requests are limited to {quota} per {window}. Please try again later.")
    } else {
        format!("You have reached the limit of {quota} reviews per {window}. Please try again later.")
    }
}

fn local_message(is_bot: bool, policy: &Policy) -> String {
    let quota = policy.effective_quota(is_bot);
    let window = describe_window(policy.window);
    if is_bot {
        format!("Bot traffic detected. Automated clients may submit {quota} reviews per {window}.")
    } else {
        format!("Review limit of {quota} per {window} reached. Check resetTime for when you can submit again.")
    }
}

// "hour", "24 hours", "30 minutes"
pub fn describe_window(window: Duration) -> String {
    let secs = window.as_secs();
    let (n, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if n == 1 {
        unit.to_string()
    } else {
        format!("{n} {unit}s")
    }
}
