use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// --- Data Structures ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub category: String,
    pub keywords: Vec<String>,
    pub question: String,
    pub answer: String,
}

impl KnowledgeEntry {
    /// Lowercases keywords, drops blank ones and rejects entries that could never answer.
    fn validated(mut self) -> Result<Self> {
        self.keywords = self
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if self.keywords.is_empty() {
            bail!("entry '{}' has no keywords", self.category);
        }
        if self.answer.trim().is_empty() {
            bail!("entry '{}' has an empty answer", self.category);
        }
        Ok(self)
    }
}

/// Trigger words checked before the knowledge base, each list with its fixed answer.
#[derive(Debug, Clone)]
pub struct SpecialIntents {
    pub greetings: Vec<String>,
    pub thanks: Vec<String>,
    pub help: Vec<String>,
    pub greeting_answer: String,
    pub thanks_answer: String,
    pub help_answer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuickAction {
    pub label: String,
    pub question: String,
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    specials: SpecialIntents,
    quick_actions: Vec<QuickAction>,
}

impl KnowledgeBase {
    pub fn new(
        entries: Vec<KnowledgeEntry>,
        specials: SpecialIntents,
        quick_actions: Vec<QuickAction>,
    ) -> Result<Self> {
        if entries.is_empty() {
            bail!("knowledge base has no entries");
        }
        let entries = entries
            .into_iter()
            .map(KnowledgeEntry::validated)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            entries,
            specials,
            quick_actions,
        })
    }

    /// The service center's own topics, greetings and quick actions.
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
            specials: builtin_specials(),
            quick_actions: builtin_quick_actions(),
        }
    }

    /// Reads one JSON entry per line. Blank lines are ignored and bad lines are
    /// skipped with a warning; special intents and quick actions stay built in.
    pub fn from_jsonl<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.context("failed to read knowledge line")?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<KnowledgeEntry>(&line)
                .map_err(anyhow::Error::from)
                .and_then(KnowledgeEntry::validated);
            match parsed {
                Ok(entry) => entries.push(entry),
                Err(e) => log::warn!("Skipping knowledge line #{}: {}", i + 1, e),
            }
        }
        if entries.is_empty() {
            bail!("no valid knowledge entries found");
        }
        Self::new(entries, builtin_specials(), builtin_quick_actions())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)
            .with_context(|| format!("Failed to open knowledge file at '{}'", path_ref.display()))?;
        let base = Self::from_jsonl(BufReader::new(file))
            .with_context(|| format!("Invalid knowledge file '{}'", path_ref.display()))?;
        log::info!("Loaded {} knowledge entries from {:?}", base.entries.len(), path_ref);
        Ok(base)
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn specials(&self) -> &SpecialIntents {
        &self.specials
    }

    pub fn quick_actions(&self) -> &[QuickAction] {
        &self.quick_actions
    }

    /// (category, canonical question) pairs for the FAQ list.
    pub fn questions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.category.as_str(), e.question.as_str()))
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

// --- Built-in Content ---

fn entry(category: &str, keywords: &[&str], question: &str, answer: &str) -> KnowledgeEntry {
    KnowledgeEntry {
        category: category.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

// Order is the tie-break order: `cancel` must stay ahead of `booking`, and the
// broad `service_types` goes last so "service" alone never outvotes a topic.
fn builtin_entries() -> Vec<KnowledgeEntry> {
    vec![
        entry(
            "cancel",
            &["cancel", "remove", "delete", "stop", "cancle", "canel", "cansle", "canceling"],
            "How do I cancel an appointment?",
            "Go to \"Appointments\" page and click the \"Cancel\" button next to your scheduled booking. You can only cancel appointments that haven't started yet.",
        ),
        entry(
            "booking",
            &["book", "appointment", "schedule", "reserve", "appoint", "apointment", "schedul", "boking", "buk"],
            "How do I book an appointment?",
            "Go to \"Book Appointment\" in the menu and select your vehicle, service type, and preferred date. You can also click the \"Book Appointment\" button on your dashboard.",
        ),
        entry(
            "vehicle",
            &["vehicle", "car", "add", "new", "register", "vehical", "vehcile", "vahicle", "veicle"],
            "How can I add a new vehicle?",
            "Navigate to \"My Vehicles\" from the menu and click the \"Add Vehicle\" button. Fill in your vehicle details like make, model, year, and registration number.",
        ),
        entry(
            "discount",
            &["discount", "offer", "cheap", "price", "off-peak", "offpeak", "save", "discunt", "discout", "saving"],
            "What are off-peak discounts?",
            "Book on weekdays (Monday-Friday) to get a 5% discount on all services! Weekend bookings don't have discounts. The system automatically applies the discount.",
        ),
        entry(
            "payment",
            &["payment", "pay", "money", "card", "cash", "price", "cost", "paymet", "paymnt"],
            "What payment methods do you accept?",
            "We accept cash and all major credit/debit cards (Visa, MasterCard, Amex) at the service center. Payment is made after service completion.",
        ),
        entry(
            "status",
            &["status", "track", "progress", "where", "check", "statu", "progres"],
            "How can I track my service status?",
            "Go to \"Appointments\" page to see the status of all your bookings. Status updates include: Scheduled, In Progress, and Completed.",
        ),
        entry(
            "time",
            &["time", "hours", "open", "close", "when", "timing", "hour"],
            "What are your service hours?",
            "We are open Monday to Friday: 9:00 AM - 5:00 PM. Available time slots are: 9:00, 10:00, 11:00, 12:00, 2:00, 3:00, 4:00, and 5:00 PM.",
        ),
        entry(
            "edit",
            &["edit", "change", "modify", "update", "editing", "edited", "eddit", "chang", "modifi"],
            "Can I edit my appointment?",
            "Currently you need to cancel the existing appointment and create a new one with your preferred details. Go to Appointments → Cancel → Book New.",
        ),
        entry(
            "feedback",
            &["feedback", "review", "rating", "rate", "comment", "feedbak", "revew", "raiting"],
            "How do I leave feedback?",
            "After your service is completed, go to \"Appointments\" and click \"Leave Feedback\" button next to the completed service. Rate 1-5 stars and write your comments.",
        ),
        entry(
            "vehicle_info",
            &[
                "registration", "reg", "number", "license", "plate", "information", "info", "details",
                "registeration", "informaton", "imformation", "informasion",
            ],
            "What vehicle information do I need?",
            "You need: Vehicle Make (e.g., Toyota), Model (e.g., Corolla), Year, and Registration Number (e.g., ABC1234). Make sure the registration number is correct.",
        ),
        entry(
            "urgent",
            &["urgent", "urgently", "emergency", "now", "immediate", "quick", "asap", "urgnt", "emergancy"],
            "Do you handle urgent repairs?",
            "For urgent repairs, please call our service center directly. Online bookings are for scheduled services. Check your booking confirmation email for the contact number.",
        ),
        entry(
            "service_types",
            &["service", "services", "type", "repair", "maintenance", "servis"],
            "What types of services do you offer?",
            "We offer: Regular Service, Full Service, Oil Change, Brake Service, Battery Replacement, Tire Service, Engine Repair, Transmission Service, AC Service, and Electrical Work.",
        ),
    ]
}

fn builtin_specials() -> SpecialIntents {
    SpecialIntents {
        greetings: words(&["hi", "hello", "hey", "good morning", "good afternoon", "good evening", "helo", "hai"]),
        thanks: words(&["thank", "thanks", "thanku", "thx", "thnks", "thnx"]),
        help: words(&["help", "assist", "support", "guide", "hlp", "asist"]),
        greeting_answer: "Hello! 👋 I can help you with: booking appointments, adding vehicles, checking discounts, canceling bookings, payment methods, service types, and more. What would you like to know?".to_string(),
        thanks_answer: "You're welcome! 😊 Is there anything else I can help you with?".to_string(),
        help_answer: "I can help you with:\n• Booking appointments\n• Adding vehicles\n• Checking service status\n• Understanding discounts\n• Payment information\n• Service types\n\nWhat would you like to know?".to_string(),
    }
}

fn builtin_quick_actions() -> Vec<QuickAction> {
    [
        ("📅 Book appointment", "How do I book an appointment?"),
        ("🚗 Add vehicle", "How can I add a new vehicle?"),
        ("💰 Discount info", "What are off-peak discounts?"),
        ("❌ Cancel booking", "How do I cancel an appointment?"),
        ("⭐ Leave feedback", "How do I leave feedback?"),
    ]
    .iter()
    .map(|(label, question)| QuickAction {
        label: label.to_string(),
        question: question.to_string(),
    })
    .collect()
}
