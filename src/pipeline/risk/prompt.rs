use super::types::CareLogEntry;

/// Sampling settings for the primary assessment call.
pub const ASSESSMENT_TEMPERATURE: f32 = 0.2;
pub const ASSESSMENT_MAX_TOKENS: u32 = 800;

/// Sampling settings for the JSON refinement call. Reformatting is shorter
/// than free generation and should be near-deterministic.
pub const REFINE_TEMPERATURE: f32 = 0.0;
pub const REFINE_MAX_TOKENS: u32 = 600;

/// Upper bound on `tasks` per finding, stated in the prompt.
pub const MAX_TASKS_PER_FINDING: usize = 3;

pub const RISK_SYSTEM_PROMPT: &str = r#"あなたは介護記録から認知症に関連する危険兆候を抽出するアシスタントです。
出力は有効なJSONのみとしてください。コードブロック（```）や説明文は付けないこと。文字列は必ずダブルクオートで囲むこと。
次のスキーマに厳密に従ってください。tasks は最大3件、goal は短く具体的に書くこと。

Schema:
{
  "riskLevel": "medium|high",
  "findings": [
    {
      "id": "string",
      "title": "string",
      "severity": "medium|high",
      "evidence": ["string", "..."],
      "recommendation": "string",
      "tasks": ["string", "..."],
      "goal": "string"
    }
  ],
  "notes": "string"
}

評価の観点の例：服薬忘れ・服薬拒否、転倒リスク（ふらつき、夜間のトイレ頻回）、脱水・栄養低下、睡眠障害、道に迷う・見当識障害、感情の変化など。
推測しすぎないこと。各 finding の evidence には根拠となるログ本文をそのまま引用してください。
入力ログに含まれるのは id と content（本文）のみで、日付・時刻・記録者・タグはありません。
すべて日本語で記載してください。"#;

pub const REFINE_SYSTEM_PROMPT: &str = "次の入力はモデルの出力です。この内容から、スキーマに準拠した有効なJSONのみを返してください。コードブロックや説明は付けないこと。";

/// Serialize the caller's logs as the user message: `{"careLogs": [...]}`.
pub fn build_user_content(logs: &[CareLogEntry]) -> String {
    serde_json::json!({ "careLogs": logs }).to_string()
}
