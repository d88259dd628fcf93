use crate::schema::{BookingAction, BookingCard, BookingCategory, TripSummary};

pub const UNCONFIRMED_ITINERARY: &str = "尚未確認具體行程";
pub const NOTHING_PENDING: &str = "無特別待定事項";
pub const ITINERARY_CONFLICT: &str = "行程衝突：有人想滑雪，有人想逛街，需協調時間";
pub const FIND_YAKINIKU: &str = "晚餐找燒肉餐廳";
pub const SKI_TRIP: &str = "越後湯澤滑雪行程";
pub const FUJI_TRIP: &str = "河口湖看富士山";
pub const BUDGET_ECONOMY: &str = "TWD 30,000 / 人 (小資方案)";
pub const BUDGET_STANDARD: &str = "TWD 45,000 - 60,000 / 人 (依實際住宿為準)";

/// One row of the extraction table: when `matches` holds for the scan
/// buffer, `apply` adds its findings to the summary.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub apply: fn(&mut TripSummary),
}

impl Rule {
    pub fn evaluate(&self, buffer: &str, summary: &mut TripSummary) -> bool {
        if (self.matches)(buffer) {
            (self.apply)(summary);
            true
        } else {
            false
        }
    }
}

/// Evaluated top to bottom. Booking card order in the result follows this order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "ski_trip",
        matches: mentions_skiing,
        apply: add_ski_trip,
    },
    Rule {
        name: "fuji_trip",
        matches: mentions_fuji,
        apply: add_fuji_trip,
    },
    Rule {
        name: "ski_shopping_conflict",
        matches: mentions_ski_and_shopping,
        apply: add_conflict,
    },
    Rule {
        name: "yakiniku_dinner",
        matches: mentions_yakiniku,
        apply: add_yakiniku,
    },
    Rule {
        name: "japan_flight",
        matches: mentions_japan,
        apply: add_flight,
    },
];

/// Lower-cased concatenation of every message text, single-space separated.
pub fn scan_buffer<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    texts
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn extract(buffer: &str) -> TripSummary {
    let mut summary = TripSummary {
        confirmed_itinerary: Vec::new(),
        estimated_budget: String::new(),
        pending_items: Vec::new(),
        booking_cards: Vec::new(),
    };

    for rule in RULES {
        rule.evaluate(buffer, &mut summary);
    }

    if summary.confirmed_itinerary.is_empty() {
        summary.confirmed_itinerary.push(UNCONFIRMED_ITINERARY.to_string());
    }
    if summary.pending_items.is_empty() {
        summary.pending_items.push(NOTHING_PENDING.to_string());
    }
    summary.estimated_budget = budget_for(buffer).to_string();

    summary
}

pub fn budget_for(buffer: &str) -> &'static str {
    if buffer.contains("省錢") {
        BUDGET_ECONOMY
    } else {
        BUDGET_STANDARD
    }
}

fn mentions_skiing(buffer: &str) -> bool {
    buffer.contains("越後湯澤") || buffer.contains("滑雪")
}

fn mentions_fuji(buffer: &str) -> bool {
    buffer.contains("富士山")
}

fn mentions_ski_and_shopping(buffer: &str) -> bool {
    buffer.contains("逛街") && buffer.contains("滑雪")
}

fn mentions_yakiniku(buffer: &str) -> bool {
    buffer.contains("燒肉") || buffer.contains("和牛")
}

fn mentions_japan(buffer: &str) -> bool {
    buffer.contains("日本") || buffer.contains("東京")
}

fn add_ski_trip(summary: &mut TripSummary) {
    summary.confirmed_itinerary.push(SKI_TRIP.to_string());
    summary.booking_cards.push(ski_hotel_card());
    summary.booking_cards.push(ski_lesson_card());
}

fn add_fuji_trip(summary: &mut TripSummary) {
    summary.confirmed_itinerary.push(FUJI_TRIP.to_string());
}

fn add_conflict(summary: &mut TripSummary) {
    summary.pending_items.push(ITINERARY_CONFLICT.to_string());
}

fn add_yakiniku(summary: &mut TripSummary) {
    summary.pending_items.push(FIND_YAKINIKU.to_string());
    summary.booking_cards.push(yakiniku_card());
}

fn add_flight(summary: &mut TripSummary) {
    summary.booking_cards.push(flight_card());
}

fn action(label: &str, url: &str) -> BookingAction {
    BookingAction {
        label: label.to_string(),
        url: url.to_string(),
    }
}

const KAGETSU_URL: &str = "https://www.klook.com/zh-TW/hotels/detail/558686-shosenkaku-kagetsu/?spm=SearchResult.SearchResult_LIST&clickId=93be432246";

fn ski_hotel_card() -> BookingCard {
    BookingCard {
        category: BookingCategory::Hotel,
        title: "松泉閤花月 (Shosenkaku Kagetsu)".to_string(),
        rating: 4.6,
        price: "NT$ 7,495 / 晚".to_string(),
        image_url: Some("https://images.pexels.com/photos/164595/pexels-photo-164595.jpeg?auto=compress&cs=tinysrgb&w=800".to_string()),
        actions: vec![action("查看詳情", KAGETSU_URL), action("立即預訂", KAGETSU_URL)],
    }
}

fn ski_lesson_card() -> BookingCard {
    BookingCard {
        category: BookingCategory::Experience,
        title: "湯澤滑雪場中文私人滑雪課程".to_string(),
        rating: 5.0,
        price: "3小時NT$ 13,750起".to_string(),
        image_url: Some("https://images.pexels.com/photos/848682/pexels-photo-848682.jpeg?auto=compress&cs=tinysrgb&w=800".to_string()),
        actions: vec![action(
            "看體驗",
            "https://www.klook.com/zh-TW/activity/128393-echigo-yuzawa-ski-lesson/?ad_feed_id=560&aid=api%7C13179%7CYZYzcMjK1B&openExternalBrowser=1&utm_medium=affiliate-alwayson&utm_source=non-network&utm_campaign=13179&utm_term=",
        )],
    }
}

fn yakiniku_card() -> BookingCard {
    BookingCard {
        category: BookingCategory::Restaurant,
        title: "燒肉さかえや".to_string(),
        rating: 4.2,
        price: "NT$ 1,200 / 人".to_string(),
        image_url: Some("https://images.pexels.com/photos/3186654/pexels-photo-3186654.jpeg?auto=compress&cs=tinysrgb&w=800".to_string()),
        actions: vec![action(
            "查看詳情",
            "https://www.google.com/maps/place/Yakiniku+Sakaeya/@36.93705,138.5193099,11z/data=!4m6!3m5!1s0x601e023aeb29086d:0x607e4cf5fcac68d7!8m2!3d36.9372269!4d138.8109907!16s%2Fg%2F1tkf11f3?entry=tts&g_ep=EgoyMDI1MTIwOC4wIPu8ASoASAFQAw%3D%3D&skid=e9aec243-5bdb-4431-9059-9ed103ea5390",
        )],
    }
}

fn flight_card() -> BookingCard {
    BookingCard {
        category: BookingCategory::Flight,
        title: "台北 (TPE) ⇌ 東京 (NRT) 來回機票".to_string(),
        rating: 0.0,
        price: "NT$ 7,887 起".to_string(),
        image_url: Some("https://images.unsplash.com/photo-1436491865332-7a61a109cc05?q=80&w=400&auto=format&fit=crop".to_string()),
        actions: vec![action(
            "查看航班",
            "https://travel.line.me/flights/list?roundType=1&cabinClass=1&numOfAdult=1&numOfChildren=0&numOfBaby=0&linePointsRebateOnly=1&departureAirports=&departureCities=TPE&departureDates=1772668800000&arrivalAirports=&arrivalCities=TYO&departureAirports=&departureCities=TYO&departureDates=1773273600000&arrivalAirports=&arrivalCities=TPE",
        )],
    }
}
