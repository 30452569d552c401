use crate::image::loader::MAX_IMAGE_BYTES;
use anyhow::Result;
use std::path::PathBuf;

/// base64 后的最大图像加上 JSON 外壳的余量
const BODY_SLACK: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// 服务器绑定地址
    pub bind_addr: String,

    /// 模型文件目录
    pub models_dir: PathBuf,

    /// Crop/State 选项数据集 (CSV)
    pub dataset_path: PathBuf,

    /// 开发模式
    pub dev_mode: bool,

    /// ONNX Runtime配置
    pub onnx_config: OnnxConfig,

    /// 服务器配置
    pub server_config: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// CPU线程数
    pub intra_threads: usize,

    /// 优化级别 (0-3)
    pub optimization_level: i32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 请求超时时间（秒）
    pub request_timeout: u64,

    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

impl Config {
    pub fn new(
        bind_addr: String,
        models_dir: String,
        dataset_path: String,
        dev_mode: bool,
    ) -> Result<Self> {
        let cpu_cores = num_cpus::get();

        let onnx_config = OnnxConfig {
            intra_threads: (cpu_cores * 3 / 4).max(1), // 使用75%的CPU核心
            optimization_level: 3,
        };

        let server_config = ServerConfig {
            request_timeout: if dev_mode { 300 } else { 60 }, // 开发模式更长超时
            max_request_size: MAX_IMAGE_BYTES.div_ceil(3) * 4 + BODY_SLACK,
        };

        Ok(Self {
            bind_addr,
            models_dir: PathBuf::from(models_dir),
            dataset_path: PathBuf::from(dataset_path),
            dev_mode,
            onnx_config,
            server_config,
        })
    }

    /// 病害分类模型路径
    pub fn disease_model_path(&self) -> PathBuf {
        self.models_dir.join("plant_disease_model.onnx")
    }

    /// 产量回归模型路径
    pub fn yield_model_path(&self) -> PathBuf {
        self.models_dir.join("crop_yield_model.onnx")
    }

    /// 产量特征编码器路径
    pub fn yield_encoder_path(&self) -> PathBuf {
        self.models_dir.join("crop_yield_encoder.json")
    }

    /// 可选的标签文件路径
    pub fn labels_path(&self) -> PathBuf {
        self.models_dir.join("labels.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_live_under_models_dir() {
        let config = Config::new(
            "127.0.0.1:0".to_string(),
            "/srv/models".to_string(),
            "crop_yield.csv".to_string(),
            false,
        )
        .unwrap();

        assert_eq!(
            config.disease_model_path(),
            PathBuf::from("/srv/models/plant_disease_model.onnx")
        );
        assert_eq!(
            config.yield_encoder_path(),
            PathBuf::from("/srv/models/crop_yield_encoder.json")
        );
        assert!(config.onnx_config.intra_threads >= 1);
        assert_eq!(config.server_config.request_timeout, 60);
    }

    #[test]
    fn dev_mode_extends_timeout() {
        let config = Config::new(
            "127.0.0.1:0".to_string(),
            "models".to_string(),
            "crop_yield.csv".to_string(),
            true,
        )
        .unwrap();
        assert_eq!(config.server_config.request_timeout, 300);
    }

    #[test]
    fn body_limit_admits_largest_base64_image() {
        let config = Config::new(
            "127.0.0.1:0".to_string(),
            "models".to_string(),
            "crop_yield.csv".to_string(),
            false,
        )
        .unwrap();

        let largest = base64::encoded_len(MAX_IMAGE_BYTES, true);
        let envelope = r#"{"image":"data:image/jpeg;base64,"}"#.len();
        assert!(config.server_config.max_request_size >= largest.unwrap() + envelope);
    }
}
