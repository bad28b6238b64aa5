//! LLM 判分服务 - 业务能力层
//!
//! 只负责"请求判分模型"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 DeepSeek 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::JudgeFailure;
use crate::services::judge::{Judge, JudgeRequest, JudgeVerdictMapper, SYSTEM_MESSAGE};

/// 基于 LLM 的判分服务
///
/// 职责：
/// - 按固定提示词请求判分模型
/// - 把超时、网络错误、空回复转换成 `JudgeFailure`
/// - 不做标签解析，不做重试
pub struct LlmJudge {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout: Duration,
    mapper: JudgeVerdictMapper,
}

impl LlmJudge {
    /// 创建新的判分服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            timeout: Duration::from_secs(config.judge_timeout_secs),
            mapper: JudgeVerdictMapper::new(),
        }
    }

    /// 发送一次聊天请求
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: &str,
    ) -> Result<String, JudgeFailure> {
        debug!("调用判分模型，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| JudgeFailure::Transport(e.to_string()))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| JudgeFailure::Transport(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .build()
            .map_err(|e| JudgeFailure::Transport(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| JudgeFailure::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                warn!("判分模型调用失败: {}", e);
                JudgeFailure::Transport(e.to_string())
            })?;

        debug!("判分模型调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(JudgeFailure::UnrecognizedResponse(content));
        }
        Ok(content)
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn adjudicate(&self, request: &JudgeRequest) -> Result<String, JudgeFailure> {
        let prompt = self.mapper.build_prompt(request);
        self.send_to_llm(&prompt, SYSTEM_MESSAGE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionTypeBucket;

    /// 创建测试用的判分服务（读取环境变量中的密钥）
    fn create_test_judge() -> LlmJudge {
        let config = Config::from_env().unwrap_or_default();
        LlmJudge::new(&config)
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_or_timeout() {
        let config = Config {
            llm_api_base_url: "http://127.0.0.1:9/v1".to_string(),
            judge_timeout_secs: 5,
            ..Config::default()
        };
        let judge = LlmJudge::new(&config);
        let request = JudgeRequest {
            bucket: QuestionTypeBucket::Choice,
            question: "1+1=?".into(),
            gold_answer: "2".into(),
            pred_answer: "3".into(),
        };
        let err = judge.adjudicate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            JudgeFailure::Transport(_) | JudgeFailure::Timeout { .. }
        ));
    }

    /// 测试真实判分调用
    ///
    /// 运行方式：
    /// ```bash
    /// DEEPSEEK_API_KEY=... cargo test test_live_judge -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_judge() {
        let _ = tracing_subscriber::fmt::try_init();

        let judge = create_test_judge();
        let request = JudgeRequest {
            bucket: QuestionTypeBucket::Subjective,
            question: "简述光合作用的意义".into(),
            gold_answer: "为生物提供有机物和氧气".into(),
            pred_answer: "产生氧气".into(),
        };

        match judge.adjudicate(&request).await {
            Ok(response) => {
                println!("判分模型回复: {}", response);
                assert!(!response.is_empty());
            }
            Err(e) => panic!("判分调用失败: {}", e),
        }
    }
}
