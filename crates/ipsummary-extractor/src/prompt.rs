//! Prompt construction for the four pipeline stages
//!
//! Pure functions, no I/O: document text plus configuration in, role-tagged
//! message turns out. Prompt wording is part of the pipeline's behavior
//! (key-preservation rules, date/join formats, code-to-text rules), so
//! changes here bump [`PROMPT_VERSION`], which is recorded in every
//! persisted record.

use ipsummary_domain::{ChatMessage, Direction};

/// Version tag stamped into every extraction record
pub const PROMPT_VERSION: &str = "v1.2";

/// Contract text sent to the type-classification stage is capped to this
/// many characters; type signals live near the head of a contract
const TYPE_CLASSIFICATION_TEXT_LIMIT: usize = 8000;

const CLASSIFICATION_SYSTEM: &str = "You are a legal contract classifier for IP authorization chains. \
Given the contract content and the party representing 'us', decide \
whether the contract is upstream or downstream relative to us. \
Definitions: upstream = we acquire rights/commission content from the counterparty; \
downstream = we license/transfer/authorize rights to the counterparty. \
Return JSON only with keys direction (upstream/downstream), confidence (0-1), reason (max 50 Chinese characters). \
If both exist, pick the dominant nature.";

const EXTRACTION_SYSTEM: &str = "You are an IP authorization contract analyst. \
Extract required fields as JSON using the provided headers EXACTLY as keys (do not改写字段名). \
Use Chinese values from the contract. If a field is not present, keep it null. \
Prefer ISO dates (YYYY-MM-DD). Multi-values join with '、'. Do not invent data. \
Output MUST be raw JSON only (no Markdown, no code fences, no explanations).\n\n\
【重要】对于选项类字段（如'合同类型 1：主合同，2 补充合同3 终止合同'），请输出中文文字值而非编号。\n\
例如：\n\
- '合同类型'字段：输出'主合同'而非'1'\n\
- '我方主体'字段：输出'上海玄霆'而非'1'\n\
- '是否独家'字段：输出'是'或'独家'而非'1'\n\
- '对方类型'字段：输出'公司'或'个人'而非编号\n\
- 其他选项字段同理，一律输出可读的中文文字";

const TYPE_CLASSIFICATION_SYSTEM: &str = "你是一个专业的IP版权合同分类专家。请根据合同内容判断其所属的合同类型。\n\
只能从给定的类型列表中选择最匹配的一个类型。\n\
如果无法明确归类，请选择'通用类型'。\n\
返回JSON格式：{\"contract_type\": \"类型名称\", \"confidence\": 0.0-1.0, \"reason\": \"判断理由（不超过50字）\"}";

const NOTE_GENERATION_SYSTEM: &str = "你是一个专业的合同备注生成专家。请根据给定的模板格式，从合同中提取相关信息并生成合同备注。\n\
要求：\n\
1. 严格按照模板格式输出，保持模板的结构和序号\n\
2. 将模板中的{占位符}替换为从合同中提取的实际信息\n\
3. 无法从合同中找到的信息，替换为\"未在合同中明确\"\n\
4. 金额、日期、比例等数据必须准确提取，不可编造\n\
5. 只输出备注内容本身，不要添加额外说明或Markdown格式\n\
6. 保持简洁，避免冗余描述";

/// Messages asking for the `{direction, confidence, reason}` verdict
pub fn classification_messages(contract_text: &str, my_party: &str) -> Vec<ChatMessage> {
    let user = format!(
        "我方主体：{my_party}\n\n合同内容：\n{contract_text}\n\n\
         请只输出 JSON，例如 {{\"direction\":\"upstream\",\"confidence\":0.82,\"reason\":\"...原因\"}}"
    );
    vec![
        ChatMessage::system(CLASSIFICATION_SYSTEM),
        ChatMessage::user(user),
    ]
}

/// Messages asking the model to fill the header template.
///
/// The user turn embeds a literal JSON template with every header mapped to
/// null; the model is told to replace only the values, never the keys.
pub fn extraction_messages(
    contract_text: &str,
    headers: &[String],
    my_party: &str,
    direction: Direction,
) -> Vec<ChatMessage> {
    let dir_cn = match direction {
        Direction::Upstream => "上游",
        Direction::Downstream => "下游",
    };
    let template_lines: Vec<String> = headers.iter().map(|h| format!("  \"{h}\": null")).collect();
    let json_template = format!("{{\n{}\n}}", template_lines.join(",\n"));

    let user = format!(
        "我方主体：{my_party}\n\
         合同方向：{dir_cn}（direction={direction}）\n\
         请按下方 JSON 模板填充值，键名不可改动，只替换 null 为提取结果（缺失则保留 null）。\n\
         【注意】选项类字段请输出中文文字（如'主合同'、'公司'、'是'），不要输出编号！\n\
         {json_template}\n\n\
         合同全文：\n{contract_text}\n\n\
         直接输出 JSON（不加```、不加额外文字）。"
    );
    vec![
        ChatMessage::system(EXTRACTION_SYSTEM),
        ChatMessage::user(user),
    ]
}

/// Messages asking the model to pick one type from a closed list.
///
/// `hint` carries the keyword pre-filter's guess; the model is asked to
/// verify it rather than trust it.
pub fn type_classification_messages(
    contract_text: &str,
    type_listing: &str,
    hint: Option<&str>,
) -> Vec<ChatMessage> {
    let truncated: String = contract_text
        .chars()
        .take(TYPE_CLASSIFICATION_TEXT_LIMIT)
        .collect();
    let hint_line = match hint {
        Some(hint) => format!("\n（关键词预筛选提示：可能是 {hint}，请验证）"),
        None => String::new(),
    };
    let user = format!(
        "请判断以下合同属于哪种类型：\n\n\
         可选类型列表：\n{type_listing}\n\n\
         合同内容：\n{truncated}\n{hint_line}\n\n\
         请只输出JSON，不要添加其他说明。"
    );
    vec![
        ChatMessage::system(TYPE_CLASSIFICATION_SYSTEM),
        ChatMessage::user(user),
    ]
}

/// Messages asking the model to fill a note template for a resolved type
pub fn note_generation_messages(
    contract_text: &str,
    contract_type: &str,
    template: &str,
    my_party: &str,
) -> Vec<ChatMessage> {
    let user = format!(
        "我方主体：{my_party}\n\
         合同类型：{contract_type}\n\n\
         备注模板：\n{template}\n\n\
         合同全文：\n{contract_text}\n\n\
         请根据模板格式生成合同备注，直接输出备注内容（不要用```包裹）："
    );
    vec![
        ChatMessage::system(NOTE_GENERATION_SYSTEM),
        ChatMessage::user(user),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_prompt_carries_party_and_text() {
        let messages = classification_messages("合同正文", "上海玄霆");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("legal contract classifier"));
        assert!(messages[1].content.contains("上海玄霆"));
        assert!(messages[1].content.contains("合同正文"));
    }

    #[test]
    fn extraction_prompt_embeds_null_template() {
        let headers = vec!["作品名称".to_string(), "合同类型".to_string()];
        let messages =
            extraction_messages("正文", &headers, "上海玄霆", Direction::Downstream);
        let user = &messages[1].content;
        assert!(user.contains("\"作品名称\": null"));
        assert!(user.contains("\"合同类型\": null"));
        assert!(user.contains("下游"));
        assert!(user.contains("direction=downstream"));
        assert!(messages[0].content.contains("Multi-values join with '、'"));
        assert!(messages[0].content.contains("输出中文文字值而非编号"));
    }

    #[test]
    fn type_prompt_truncates_and_hints() {
        let long_text: String = "约".repeat(10_000);
        let messages = type_classification_messages(&long_text, "1. 通用类型", Some("作品授权合同"));
        let user = &messages[1].content;
        assert!(user.contains("关键词预筛选提示：可能是 作品授权合同"));
        // Only the first 8000 chars of the contract survive.
        let body_chars = user.chars().filter(|c| *c == '约').count();
        assert_eq!(body_chars, TYPE_CLASSIFICATION_TEXT_LIMIT);

        let without_hint = type_classification_messages("短文", "1. 通用类型", None);
        assert!(!without_hint[1].content.contains("关键词预筛选提示"));
    }

    #[test]
    fn note_prompt_includes_template_and_marker_rule() {
        let messages = note_generation_messages("正文", "作品授权合同", "1. {作品名称}", "玄霆");
        assert!(messages[0].content.contains("未在合同中明确"));
        assert!(messages[1].content.contains("1. {作品名称}"));
        assert!(messages[1].content.contains("作品授权合同"));
    }
}
