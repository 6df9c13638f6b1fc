//! Candidate-module retrieval
//!
//! Deterministic keyword/rule scoring standing in for a vector search. The
//! "semantic" layer is two hand-authored lookup tables: trigger words that
//! award a per-module bonus, and a primary-module -> related-modules map used
//! to boost companion candidates once a primary intent is clear.

use std::collections::HashMap;

use crate::model::ModuleSummary;

/// A candidate scoring at or above this is treated as the primary intent.
const ASSOCIATION_THRESHOLD: i32 = 10;
/// Boost applied to modules related to the primary intent.
const ASSOCIATION_BOOST: i32 = 4;

const KEYWORD_WEIGHT: i32 = 10;
const NAME_WEIGHT: i32 = 5;

lazy_static::lazy_static! {
    /// module id -> (trigger words, bonus). The bonus applies once if any
    /// trigger is a substring of the query, not per trigger.
    static ref SEMANTIC_RULES: HashMap<&'static str, (&'static [&'static str], i32)> = {
        let mut m: HashMap<&'static str, (&'static [&'static str], i32)> = HashMap::new();
        m.insert("flight", (&["机票", "航班", "飞机", "订票", "出差", "旅行", "fly", "flight", "travel"][..], 8));
        m.insert("shopping", (&["买", "购物", "特产", "商品", "价格", "多少钱", "buy", "shop", "price", "cost"][..], 7));
        m.insert("yelp", (&["吃", "饿", "美食", "餐厅", "附近", "cafe", "bar", "drink", "eat", "food", "restaurant"][..], 8));
        m.insert("videos", (&["视频", "播放", "观看", "video", "watch", "play"][..], 7));
        m.insert("images", (&["图片", "照片", "相片", "image", "photo", "picture"][..], 7));
        m.insert("music", (&["音乐", "歌曲", "听歌", "music", "song", "listen", "audio"][..], 9));
        m.insert("rent", (&["租房", "找房", "公寓", "合租", "房租", "rent", "apartment"][..], 9));
        m.insert("movie", (&["电影", "影片", "movie", "film"][..], 9));
        m.insert("info_card", (&["搜索", "查询", "天气", "汇率", "新闻", "是谁", "什么", "search", "info", "weather", "news"][..], 6));
        m.insert("line_general_agent", (&["聊天", "消息", "询问", "联系", "发消息", "chat", "message", "ask"][..], 8));
        m.insert("general_agent", (&["邮件", "日历", "地图", "gmail", "calendar", "google", "发邮件", "email"][..], 7));
        m.insert("orchestration_agent", (&["编排", "工作流", "多步骤", "安排", "计划", "早安", "routine", "workflow", "arrange", "plan"][..], 6));
        m.insert("meeting_view", (&["位置", "会面", "约会", "见面", "哪里见", "推荐个", "meet", "date", "location"][..], 9));
        m
    };

    /// primary module id -> companion modules worth surfacing alongside it.
    static ref RELATED_MODULES: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("flight", &["hotel", "yelp", "info_card", "shopping", "rent"][..]);
        m.insert("hotel", &["yelp", "map_view", "flight", "rent"][..]);
        m.insert("yelp", &["map_view", "ride_hailing"][..]);
        m.insert("meeting_view", &["yelp", "line_general_agent", "movie"][..]);
        m.insert("videos", &["images", "info_card"][..]);
        m.insert("shopping", &["info_card"][..]);
        m.insert("movie", &["yelp", "meeting_view"][..]);
        m.insert("rent", &["map_view", "yelp"][..]);
        m
    };
}

pub struct Retriever;

impl Retriever {
    /// Rank `candidates` against `query` and return the top `top_k`.
    ///
    /// Pure and deterministic: identical inputs always produce identical
    /// output, equal scores preserve candidate order, and non-positive scores
    /// never make the cut.
    pub fn search(
        query: &str,
        candidates: &[ModuleSummary],
        top_k: usize,
    ) -> Vec<ModuleSummary> {
        let query_lower = query.to_lowercase();

        let mut scored: Vec<(ModuleSummary, i32)> = candidates
            .iter()
            .map(|m| (m.clone(), Self::score(&query_lower, m)))
            .collect();

        // Association boost: the first candidate clearing the threshold is
        // the primary intent; its companions among the candidates get pulled
        // up. Related ids with no candidate are ignored.
        let primary = scored
            .iter()
            .find(|(_, score)| *score >= ASSOCIATION_THRESHOLD)
            .map(|(m, _)| m.id.clone());

        if let Some(primary_id) = primary {
            let related = RELATED_MODULES
                .get(primary_id.as_str())
                .copied()
                .unwrap_or(&[]);

            for related_id in related {
                if let Some(entry) = scored.iter_mut().find(|(m, _)| m.id == *related_id) {
                    entry.1 += ASSOCIATION_BOOST;
                    tracing::debug!(
                        "Association boost: {} -> {} (+{})",
                        primary_id,
                        related_id,
                        ASSOCIATION_BOOST
                    );
                }
            }
        }

        // Stable descending sort keeps input order for ties.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        scored
            .into_iter()
            .filter(|(_, score)| *score > 0)
            .take(top_k)
            .map(|(m, _)| m)
            .collect()
    }

    /// Relevance of one candidate for a lower-cased query.
    fn score(query_lower: &str, module: &ModuleSummary) -> i32 {
        let mut score = 0;

        for keyword in &module.keywords {
            if query_lower.contains(&keyword.to_lowercase()) {
                score += KEYWORD_WEIGHT;
            }
        }

        if query_lower.contains(&module.name.to_lowercase()) {
            score += NAME_WEIGHT;
        }

        for token in module
            .description
            .split(|c: char| c.is_whitespace() || matches!(c, '，' | '。' | '、' | ',' | '.'))
        {
            if token.chars().count() > 1 && query_lower.contains(&token.to_lowercase()) {
                score += 1;
            }
        }

        score + Self::semantic_bonus(query_lower, &module.id)
    }

    fn semantic_bonus(query_lower: &str, module_id: &str) -> i32 {
        let Some((triggers, bonus)) = SEMANTIC_RULES.get(module_id) else {
            return 0;
        };

        for trigger in triggers.iter() {
            if query_lower.contains(trigger) {
                return *bonus;
            }
        }

        0
    }
}
