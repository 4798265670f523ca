/*!
* 文件名: main.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: prepl-cli
* 描述: prepl命令行入口 / prepl command line entry
*/

use std::process::ExitCode;

fn main() -> ExitCode {
    prepl_cli::main()
}
