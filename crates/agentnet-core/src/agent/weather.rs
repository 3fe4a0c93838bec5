//! Weather agent with simulated data

use super::traits::Agent;
use crate::error::Result;
use crate::types::{AgentDescriptor, Message, MessageContent, Skill};
use async_trait::async_trait;
use std::fmt::Write;
use tracing::info;

const CITIES: &[&str] = &[
    "london", "paris", "new york", "tokyo", "sydney", "berlin", "rome", "madrid", "cairo", "mumbai",
];

const DEFAULT_CITY: &str = "London";

struct Conditions {
    condition: &'static str,
    temperature: &'static str,
    humidity: &'static str,
    wind: &'static str,
}

struct DayForecast {
    day: &'static str,
    condition: &'static str,
    high: &'static str,
    low: &'static str,
}

/// Answers current-weather and forecast questions for a fixed set of cities
#[derive(Debug, Default)]
pub struct WeatherAgent;

impl WeatherAgent {
    pub fn new() -> Self {
        Self
    }

    /// First known city mentioned in the query, title-cased
    fn extract_city(query: &str) -> String {
        let query = query.to_lowercase();
        CITIES
            .iter()
            .find(|city| query.contains(*city))
            .map(|city| title_case(city))
            .unwrap_or_else(|| DEFAULT_CITY.to_string())
    }

    fn current(city: &str) -> Conditions {
        let unknown = Conditions {
            condition: "Unknown",
            temperature: "N/A",
            humidity: "N/A",
            wind: "N/A",
        };
        match city {
            "London" => Conditions {
                condition: "Rainy",
                temperature: "15°C (59°F)",
                humidity: "85%",
                wind: "18 km/h",
            },
            "Paris" => Conditions {
                condition: "Sunny",
                temperature: "22°C (72°F)",
                humidity: "60%",
                wind: "10 km/h",
            },
            "New York" => Conditions {
                condition: "Partly Cloudy",
                temperature: "18°C (64°F)",
                humidity: "65%",
                wind: "15 km/h",
            },
            "Tokyo" => Conditions {
                condition: "Clear",
                temperature: "24°C (75°F)",
                humidity: "70%",
                wind: "8 km/h",
            },
            "Sydney" => Conditions {
                condition: "Mild",
                temperature: "20°C (68°F)",
                humidity: "75%",
                wind: "12 km/h",
            },
            _ => unknown,
        }
    }

    fn forecast(city: &str) -> [DayForecast; 3] {
        let day = |day, condition, high, low| DayForecast {
            day,
            condition,
            high,
            low,
        };
        match city {
            "London" => [
                day("Today", "Rainy", "15°C", "10°C"),
                day("Tomorrow", "Cloudy", "17°C", "12°C"),
                day("Day 3", "Partly Cloudy", "18°C", "11°C"),
            ],
            "Paris" => [
                day("Today", "Sunny", "22°C", "14°C"),
                day("Tomorrow", "Clear", "24°C", "16°C"),
                day("Day 3", "Partly Cloudy", "21°C", "15°C"),
            ],
            _ => [
                day("Today", "Unknown", "N/A", "N/A"),
                day("Tomorrow", "Unknown", "N/A", "N/A"),
                day("Day 3", "Unknown", "N/A", "N/A"),
            ],
        }
    }

    fn report(query: &str) -> String {
        let city = Self::extract_city(query);
        info!("[Weather Agent] Processing weather request for {}", city);

        if query.to_lowercase().contains("forecast") {
            let mut out = format!("3-Day Weather Forecast for {}:\n\n", city);
            for day in Self::forecast(&city) {
                let _ = writeln!(
                    out,
                    "{}: {}, High: {}, Low: {}",
                    day.day, day.condition, day.high, day.low
                );
            }
            out
        } else {
            let now = Self::current(&city);
            format!(
                "Current Weather in {}:\nCondition: {}\nTemperature: {}\nHumidity: {}\nWind Speed: {}",
                city, now.condition, now.temperature, now.humidity, now.wind
            )
        }
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Agent for WeatherAgent {
    fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor::new(
            "Weather Agent",
            "Provides current weather information and forecasts for locations worldwide",
            "1.0.0",
        )
        .with_skill(
            Skill::new("Current Weather", "Get current weather conditions for a location")
                .with_tags(["weather", "current", "temperature", "conditions", "forecast"])
                .with_examples(["What's the weather in London?", "Is it raining in Tokyo?"]),
        )
        .with_skill(
            Skill::new("Weather Forecast", "Get weather forecast for the coming days")
                .with_tags(["weather", "forecast", "prediction", "upcoming", "future"])
                .with_examples([
                    "What's the forecast for Paris?",
                    "Will it rain in New York tomorrow?",
                ]),
        )
    }

    async fn handle_message(&self, message: Message) -> Result<Message> {
        let query = message.text().unwrap_or_default();
        let report = Self::report(&query);
        Ok(message.reply(MessageContent::text(report)))
    }
}
